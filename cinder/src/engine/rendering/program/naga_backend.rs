use crate::rendering::program::{
    GLSL_PROFILE, NativeProgram, ParamDesc, ParamDescriptors, ParamKind, ParamType,
    ProgramBackend, ScalarType, ShaderCapabilities, StageKind, VertexElement,
};
use crate::utils::checks::validate_glsl_source;
use log::trace;
use naga::{
    AddressSpace, Binding, ImageClass, ImageDimension, Module, ScalarKind, StorageAccess,
    TypeInner, VectorSize,
};
use std::collections::HashMap;
use wgpu::{TextureViewDimension, VertexFormat};

struct NagaProgram {
    stage: StageKind,
    module: Option<Module>,
    info_log: String,
}

/// Compiles GLSL with naga's frontend and validator.
///
/// A program "links" when the module parses and validates. Reflection reads the module's
/// global variables and the entry point's location bindings.
#[derive(Default)]
pub struct NagaBackend {
    programs: HashMap<u32, NagaProgram>,
    errors: Vec<String>,
    next_handle: u32,
}

impl NagaBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn module(&self, program: NativeProgram) -> Option<&Module> {
        self.programs.get(&program.0)?.module.as_ref()
    }
}

impl ProgramBackend for NagaBackend {
    fn name(&self) -> &str {
        "naga"
    }

    fn profile_supported(&self, profile: &str) -> bool {
        profile == GLSL_PROFILE
    }

    fn capabilities(&self) -> ShaderCapabilities {
        ShaderCapabilities::VERTEX | ShaderCapabilities::FRAGMENT | ShaderCapabilities::COMPUTE
    }

    fn create_program(&mut self, stage: StageKind, source: &str) -> NativeProgram {
        let Some(naga_stage) = stage.naga_stage() else {
            self.errors
                .push(format!("naga cannot compile {stage} programs"));
            return NativeProgram::NULL;
        };

        self.next_handle += 1;
        let handle = NativeProgram(self.next_handle);

        let program = match validate_glsl_source(naga_stage, source) {
            Ok((module, _)) => NagaProgram {
                stage,
                module: Some(module),
                info_log: String::new(),
            },
            Err(e) => NagaProgram {
                stage,
                module: None,
                info_log: e.emit_to_string(source),
            },
        };

        trace!(
            "[GPU] naga program {} ({stage}) linked: {}",
            handle.0,
            program.module.is_some()
        );
        self.programs.insert(handle.0, program);
        handle
    }

    fn drain_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }

    fn link_status(&self, program: NativeProgram) -> bool {
        self.module(program).is_some()
    }

    fn info_log(&self, program: NativeProgram) -> String {
        self.programs
            .get(&program.0)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn reflect_parameters(&self, program: NativeProgram) -> ParamDescriptors {
        let mut params = ParamDescriptors::default();
        let Some(module) = self.module(program) else {
            return params;
        };

        for (_, var) in module.global_variables.iter() {
            let Some(binding) = &var.binding else {
                continue;
            };
            let ty = &module.types[var.ty];
            let name = var
                .name
                .clone()
                .or_else(|| ty.name.clone())
                .unwrap_or_default();

            let kind = match (&var.space, &ty.inner) {
                (AddressSpace::Uniform, TypeInner::Struct { members, span }) => {
                    for member in members {
                        params.push(ParamDesc {
                            name: member.name.clone().unwrap_or_default(),
                            group: binding.group,
                            binding: binding.binding,
                            kind: ParamKind::Data {
                                block: name.clone(),
                                offset: member.offset,
                                ty: param_type(&module.types[member.ty].inner),
                            },
                        });
                    }
                    ParamKind::UniformBlock { size: *span }
                }
                (AddressSpace::Uniform, inner) => ParamKind::Data {
                    block: String::new(),
                    offset: 0,
                    ty: param_type(inner),
                },
                (AddressSpace::Storage { access }, _) => ParamKind::StorageBuffer {
                    read_only: !access.contains(StorageAccess::STORE),
                },
                (
                    AddressSpace::Handle,
                    TypeInner::Image {
                        dim,
                        arrayed,
                        class,
                    },
                ) => {
                    let dim = view_dimension(*dim, *arrayed);
                    match class {
                        ImageClass::Storage { .. } => ParamKind::StorageTexture { dim },
                        ImageClass::Depth { .. } => ParamKind::Texture { dim, depth: true },
                        _ => ParamKind::Texture { dim, depth: false },
                    }
                }
                (AddressSpace::Handle, TypeInner::Sampler { comparison }) => ParamKind::Sampler {
                    comparison: *comparison,
                },
                _ => continue,
            };

            params.push(ParamDesc {
                name,
                group: binding.group,
                binding: binding.binding,
                kind,
            });
        }

        params
    }

    fn reflect_vertex_input(&self, program: NativeProgram) -> Vec<VertexElement> {
        let Some(module) = self.module(program) else {
            return Vec::new();
        };

        module
            .entry_points
            .iter()
            .filter(|ep| ep.stage == naga::ShaderStage::Vertex)
            .flat_map(|ep| ep.function.arguments.iter())
            .filter_map(|arg| {
                let Some(Binding::Location { location, .. }) = &arg.binding else {
                    return None;
                };
                let format = vertex_format(&module.types[arg.ty].inner)?;
                Some(VertexElement {
                    name: arg
                        .name
                        .clone()
                        .unwrap_or_else(|| format!("location_{location}")),
                    location: *location,
                    format,
                })
            })
            .collect()
    }

    fn delete_program(&mut self, program: NativeProgram) {
        if let Some(removed) = self.programs.remove(&program.0) {
            trace!("[GPU] Deleted naga {} program {}", removed.stage, program.0);
        } else {
            self.errors
                .push(format!("Program {} does not exist", program.0));
        }
    }
}

fn scalar_type(kind: ScalarKind) -> ScalarType {
    match kind {
        ScalarKind::Sint => ScalarType::Int,
        ScalarKind::Uint => ScalarType::UInt,
        ScalarKind::Bool => ScalarType::Bool,
        _ => ScalarType::Float,
    }
}

fn param_type(inner: &TypeInner) -> ParamType {
    match inner {
        TypeInner::Scalar(scalar) => ParamType::Scalar(scalar_type(scalar.kind)),
        TypeInner::Vector { size, scalar } => ParamType::Vector {
            size: *size as u8,
            scalar: scalar_type(scalar.kind),
        },
        TypeInner::Matrix { columns, rows, .. } => ParamType::Matrix {
            columns: *columns as u8,
            rows: *rows as u8,
        },
        TypeInner::Array { .. } => ParamType::Array,
        TypeInner::Struct { .. } => ParamType::Struct,
        _ => ParamType::Other,
    }
}

fn view_dimension(dim: ImageDimension, arrayed: bool) -> TextureViewDimension {
    match (dim, arrayed) {
        (ImageDimension::D1, _) => TextureViewDimension::D1,
        (ImageDimension::D2, false) => TextureViewDimension::D2,
        (ImageDimension::D2, true) => TextureViewDimension::D2Array,
        (ImageDimension::D3, _) => TextureViewDimension::D3,
        (ImageDimension::Cube, false) => TextureViewDimension::Cube,
        (ImageDimension::Cube, true) => TextureViewDimension::CubeArray,
    }
}

fn vertex_format(inner: &TypeInner) -> Option<VertexFormat> {
    let format = match inner {
        TypeInner::Scalar(scalar) if scalar.width == 4 => match scalar.kind {
            ScalarKind::Float => VertexFormat::Float32,
            ScalarKind::Sint => VertexFormat::Sint32,
            ScalarKind::Uint => VertexFormat::Uint32,
            _ => return None,
        },
        TypeInner::Vector { size, scalar } if scalar.width == 4 => match (scalar.kind, size) {
            (ScalarKind::Float, VectorSize::Bi) => VertexFormat::Float32x2,
            (ScalarKind::Float, VectorSize::Tri) => VertexFormat::Float32x3,
            (ScalarKind::Float, VectorSize::Quad) => VertexFormat::Float32x4,
            (ScalarKind::Sint, VectorSize::Bi) => VertexFormat::Sint32x2,
            (ScalarKind::Sint, VectorSize::Tri) => VertexFormat::Sint32x3,
            (ScalarKind::Sint, VectorSize::Quad) => VertexFormat::Sint32x4,
            (ScalarKind::Uint, VectorSize::Bi) => VertexFormat::Uint32x2,
            (ScalarKind::Uint, VectorSize::Tri) => VertexFormat::Uint32x3,
            (ScalarKind::Uint, VectorSize::Quad) => VertexFormat::Uint32x4,
            _ => return None,
        },
        _ => return None,
    };
    Some(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_stage_queues_error() {
        let mut backend = NagaBackend::new();
        let handle = backend.create_program(StageKind::Geometry, "void main() {}");

        assert!(handle.is_null());
        assert!(!backend.link_status(handle));
        assert_eq!(backend.drain_errors().len(), 1);
        assert!(backend.drain_errors().is_empty());
    }

    #[test]
    fn compute_program_links() {
        let mut backend = NagaBackend::new();
        let src = "#version 450\nlayout(local_size_x = 8) in;\nvoid main() {}\n";
        let handle = backend.create_program(StageKind::Compute, src);

        assert!(backend.link_status(handle));
        assert!(backend.info_log(handle).is_empty());
        backend.delete_program(handle);
        assert!(backend.drain_errors().is_empty());
    }
}
