//! Shader program units and the compiler pipeline behind them.
//!
//! A [`ProgramUnit`] is created from a [`ProgramDesc`] and compiled exactly once through
//! [`ProgramUnit::initialize`] against a [`DeviceContext`]. The context owns the
//! [`ProgramBackend`] doing the native work, the [`CompilerConfig`] used to preprocess
//! sources and the counters every unit reports into.
//!
//! ```text
//! Uninitialized ──initialize──▶ Compiling ──▶ Compiled
//!                                         └─▶ Failed
//! ```
//!
//! Compiled units carry their reflected [`ParamDescriptors`] and, for vertex programs, the
//! [`VertexDeclaration`] of their inputs.

mod backend;
mod context;
mod naga_backend;
mod preprocess;
mod reflect;
mod stage;

#[cfg(test)]
mod tests;

pub use backend::*;
pub use context::*;
pub use naga_backend::*;
pub use preprocess::*;
pub use reflect::*;
pub use stage::*;

use bon::Builder;
use log::{debug, warn};

pub const GLSL_PROFILE: &str = "glsl";

pub const UNSUPPORTED_PROGRAM_MESSAGE: &str =
    "Specified program is not supported by the current render system.";
pub const EMPTY_SOURCE_MESSAGE: &str = "Program source is empty.";

#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ProgramDesc {
    #[builder(into)]
    pub name: String,
    pub stage: StageKind,
    #[builder(into)]
    pub source: String,
    #[builder(into, default = GLSL_PROFILE.to_string())]
    pub profile: String,
    /// Required on top of what the stage itself needs.
    #[builder(default)]
    pub capabilities: ShaderCapabilities,
}

impl ProgramDesc {
    pub fn required_capabilities(&self) -> ShaderCapabilities {
        self.stage.required_capability() | self.capabilities
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    Uninitialized,
    Compiling,
    Compiled,
    Failed,
}

/// Snapshot of a unit after compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramReport {
    pub name: String,
    pub stage: StageKind,
    pub state: ProgramState,
    pub debug_index: Option<u32>,
    pub error: Option<String>,
    pub params: ParamDescriptors,
    pub vertex_declaration: Option<VertexDeclaration>,
}

impl ProgramReport {
    pub fn is_compiled(&self) -> bool {
        self.state == ProgramState::Compiled
    }
}

#[derive(Debug)]
pub struct ProgramUnit {
    desc: ProgramDesc,
    state: ProgramState,
    handle: NativeProgram,
    debug_index: Option<u32>,
    effective_source: Option<String>,
    error: Option<String>,
    params: ParamDescriptors,
    vertex_declaration: Option<VertexDeclaration>,
}

impl ProgramUnit {
    pub fn new(desc: ProgramDesc) -> Self {
        Self {
            desc,
            state: ProgramState::Uninitialized,
            handle: NativeProgram::NULL,
            debug_index: None,
            effective_source: None,
            error: None,
            params: ParamDescriptors::default(),
            vertex_declaration: None,
        }
    }

    pub fn initialize<B: ProgramBackend>(&mut self, ctx: &mut DeviceContext<B>) {
        if self.state != ProgramState::Uninitialized {
            warn!(
                "[GPU] Program {} was already initialized ({:?})",
                self.desc.name, self.state
            );
            return;
        }

        self.state = ProgramState::Compiling;
        ctx.record_created();

        let backend = ctx.backend();
        let supported = backend.profile_supported(&self.desc.profile)
            && backend
                .capabilities()
                .contains(self.desc.required_capabilities());
        if !supported {
            self.fail(UNSUPPORTED_PROGRAM_MESSAGE.to_string());
            return;
        }

        self.debug_index = Some(ctx.next_debug_index(self.desc.stage));

        if self.desc.source.trim().is_empty() {
            self.fail(EMPTY_SOURCE_MESSAGE.to_string());
            return;
        }

        let source = preprocess(&self.desc.source, ctx.config());
        let handle = ctx.backend_mut().create_program(self.desc.stage, &source);
        self.effective_source = Some(source);

        let errors = ctx.backend_mut().drain_errors();
        let linked = ctx.backend().link_status(handle);
        let log = ctx.backend().info_log(handle);

        if !errors.is_empty() || !linked || !log.is_empty() {
            if !handle.is_null() {
                ctx.backend_mut().delete_program(handle);
                ctx.backend_mut().drain_errors();
            }
            self.fail(diagnostics(&errors, &log));
            return;
        }

        self.handle = handle;
        self.params = ctx.backend().reflect_parameters(handle);
        if self.desc.stage == StageKind::Vertex {
            let elements = ctx.backend().reflect_vertex_input(handle);
            self.vertex_declaration = Some(VertexDeclaration::from_elements(elements));
        }
        self.state = ProgramState::Compiled;

        debug!(
            "[GPU] Compiled {} program {} #{} with {} parameters",
            self.desc.stage,
            self.desc.name,
            self.debug_index.unwrap_or_default(),
            self.params.len()
        );
    }

    /// Releases the native program. Only compiled units hold one.
    pub fn destroy<B: ProgramBackend>(self, ctx: &mut DeviceContext<B>) {
        if self.state == ProgramState::Compiled && !self.handle.is_null() {
            ctx.backend_mut().delete_program(self.handle);
        }
        ctx.record_destroyed();
    }

    fn fail(&mut self, message: String) {
        debug!("[GPU] Program {} failed: {message}", self.desc.name);
        self.state = ProgramState::Failed;
        self.error = Some(message);
    }

    pub fn desc(&self) -> &ProgramDesc {
        &self.desc
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn stage(&self) -> StageKind {
        self.desc.stage
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    pub fn is_compiled(&self) -> bool {
        self.state == ProgramState::Compiled
    }

    pub fn handle(&self) -> NativeProgram {
        self.handle
    }

    pub fn debug_index(&self) -> Option<u32> {
        self.debug_index
    }

    /// The source exactly as it was handed to the backend.
    pub fn effective_source(&self) -> Option<&str> {
        self.effective_source.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn params(&self) -> &ParamDescriptors {
        &self.params
    }

    pub fn vertex_declaration(&self) -> Option<&VertexDeclaration> {
        self.vertex_declaration.as_ref()
    }

    pub fn report(&self) -> ProgramReport {
        ProgramReport {
            name: self.desc.name.clone(),
            stage: self.desc.stage,
            state: self.state,
            debug_index: self.debug_index,
            error: self.error.clone(),
            params: self.params.clone(),
            vertex_declaration: self.vertex_declaration.clone(),
        }
    }
}

fn diagnostics(errors: &[String], log: &str) -> String {
    let mut message = String::new();
    for (i, error) in errors.iter().enumerate() {
        if i > 0 {
            message.push_str("\nPrevious errors: \n");
        }
        message.push_str(error);
    }
    if !message.is_empty() {
        message.push('\n');
    }
    if !log.is_empty() {
        message.push_str("Compile and linker info log: \n");
        message.push_str(log);
    }
    message
}
