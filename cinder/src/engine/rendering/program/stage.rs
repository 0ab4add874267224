use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

bitflags! {
    /// Shader features a backend can provide.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ShaderCapabilities: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
        const GEOMETRY = 1 << 2;
        const TESSELLATION = 1 << 3;
        const COMPUTE = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Vertex,
    Fragment,
    Geometry,
    TessellationControl,
    TessellationEvaluation,
    Compute,
}

impl StageKind {
    pub const COUNT: usize = 6;

    pub const ALL: [StageKind; Self::COUNT] = [
        StageKind::Vertex,
        StageKind::Fragment,
        StageKind::Geometry,
        StageKind::TessellationControl,
        StageKind::TessellationEvaluation,
        StageKind::Compute,
    ];

    pub const fn index(self) -> usize {
        match self {
            StageKind::Vertex => 0,
            StageKind::Fragment => 1,
            StageKind::Geometry => 2,
            StageKind::TessellationControl => 3,
            StageKind::TessellationEvaluation => 4,
            StageKind::Compute => 5,
        }
    }

    /// Stage for a shader source file extension, e.g. `vert` or `frag`.
    pub fn from_extension(ext: &str) -> Option<StageKind> {
        let stage = match ext.to_ascii_lowercase().as_str() {
            "vert" => StageKind::Vertex,
            "frag" => StageKind::Fragment,
            "geom" => StageKind::Geometry,
            "tesc" => StageKind::TessellationControl,
            "tese" => StageKind::TessellationEvaluation,
            "comp" => StageKind::Compute,
            _ => return None,
        };
        Some(stage)
    }

    pub const fn extension(self) -> &'static str {
        match self {
            StageKind::Vertex => "vert",
            StageKind::Fragment => "frag",
            StageKind::Geometry => "geom",
            StageKind::TessellationControl => "tesc",
            StageKind::TessellationEvaluation => "tese",
            StageKind::Compute => "comp",
        }
    }

    pub const fn required_capability(self) -> ShaderCapabilities {
        match self {
            StageKind::Vertex => ShaderCapabilities::VERTEX,
            StageKind::Fragment => ShaderCapabilities::FRAGMENT,
            StageKind::Geometry => ShaderCapabilities::GEOMETRY,
            StageKind::TessellationControl | StageKind::TessellationEvaluation => {
                ShaderCapabilities::TESSELLATION
            }
            StageKind::Compute => ShaderCapabilities::COMPUTE,
        }
    }

    /// The naga stage this kind compiles to. naga has no geometry or tessellation stages.
    pub const fn naga_stage(self) -> Option<naga::ShaderStage> {
        match self {
            StageKind::Vertex => Some(naga::ShaderStage::Vertex),
            StageKind::Fragment => Some(naga::ShaderStage::Fragment),
            StageKind::Compute => Some(naga::ShaderStage::Compute),
            StageKind::Geometry
            | StageKind::TessellationControl
            | StageKind::TessellationEvaluation => None,
        }
    }
}

impl Display for StageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StageKind::Vertex => "Vertex",
            StageKind::Fragment => "Fragment",
            StageKind::Geometry => "Geometry",
            StageKind::TessellationControl => "Tessellation Control",
            StageKind::TessellationEvaluation => "Tessellation Evaluation",
            StageKind::Compute => "Compute",
        };
        f.write_str(name)
    }
}
