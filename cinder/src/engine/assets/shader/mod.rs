use crate::rendering::program::{ProgramDesc, StageKind};
use serde::{Deserialize, Serialize};

/// Source text shared between shaders through `#include "name"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderInclude {
    pub source: String,
}

/// A single program stage with all of its includes already expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderSource {
    pub stage: StageKind,
    pub source: String,
    /// Names of every include that was pulled in, in the order they were first seen.
    pub includes: Vec<String>,
}

impl ShaderSource {
    pub fn program_desc(&self, name: &str) -> ProgramDesc {
        ProgramDesc::builder()
            .name(name)
            .stage(self.stage)
            .source(self.source.clone())
            .build()
    }
}
