use naga::front::glsl::{Frontend, Options, ParseErrors};
use naga::valid::{Capabilities, ModuleInfo, ValidationError, ValidationFlags, Validator};
use naga::{Module, ShaderStage, WithSpan};

#[derive(Debug)]
pub enum ShaderValidError {
    Parse(ParseErrors),
    Validation(WithSpan<ValidationError>),
}

impl ShaderValidError {
    /// Renders the diagnostics with source snippets, the way a compiler info log reads.
    pub fn emit_to_string(&self, source: &str) -> String {
        match self {
            ShaderValidError::Parse(e) => e.emit_to_string(source),
            ShaderValidError::Validation(e) => e.emit_to_string(source),
        }
    }
}

pub fn validate_glsl_source(
    stage: ShaderStage,
    source: &str,
) -> Result<(Module, ModuleInfo), ShaderValidError> {
    let module = Frontend::default()
        .parse(&Options::from(stage), source)
        .map_err(ShaderValidError::Parse)?;
    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    let info = validator
        .validate(&module)
        .map_err(ShaderValidError::Validation)?;
    Ok((module, info))
}
