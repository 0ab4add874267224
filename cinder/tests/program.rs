use cinder::Resources;
use cinder::assets::{Resource, ResourceData, ResourceManifest, ShaderSource};
use cinder::rendering::GpuThread;
use cinder::rendering::program::{
    CompilerConfig, NagaBackend, ParamKind, ParamType, ProgramDesc, ProgramState, StageKind,
    UNSUPPORTED_PROGRAM_MESSAGE,
};
use std::sync::Arc;
use wgpu::{TextureViewDimension, VertexFormat};

const LIT_VERT: &str = r#"
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;

layout(set = 0, binding = 0) uniform Camera {
    mat4 view_proj;
};

layout(location = 0) out vec2 v_uv;

void main() {
    v_uv = a_uv;
    gl_Position = view_proj * vec4(a_position, 1.0);
}
"#;

const SPRITE_FRAG: &str = r#"
layout(set = 0, binding = 0) uniform texture2D u_texture;
layout(set = 0, binding = 1) uniform sampler u_sampler;

layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 color;

void main() {
    color = texture(sampler2D(u_texture, u_sampler), v_uv);
}
"#;

fn gpu() -> GpuThread {
    let _ = env_logger::builder().is_test(true).try_init();
    GpuThread::spawn(NagaBackend::new(), CompilerConfig::default()).unwrap()
}

fn desc(name: &str, stage: StageKind, source: &str) -> ProgramDesc {
    ProgramDesc::builder()
        .name(name)
        .stage(stage)
        .source(source)
        .build()
}

#[test]
fn vertex_program_reflects_inputs_and_uniforms() {
    let gpu = gpu();
    let handle = gpu.submit(desc("Lit", StageKind::Vertex, LIT_VERT)).unwrap();
    let report = handle.wait().unwrap();

    assert!(report.is_compiled(), "{:?}", report.error);
    assert_eq!(report.debug_index, Some(1));

    let decl = report.vertex_declaration.as_ref().unwrap();
    let elements = decl.elements();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].location, 0);
    assert_eq!(elements[0].format, VertexFormat::Float32x3);
    assert_eq!(elements[1].format, VertexFormat::Float32x2);
    assert_eq!(decl.stride(), 20);

    let view_proj = report.params.find("view_proj").unwrap();
    assert_eq!(
        view_proj.kind,
        ParamKind::Data {
            block: "Camera".to_string(),
            offset: 0,
            ty: ParamType::Matrix {
                columns: 4,
                rows: 4
            },
        }
    );
    assert_eq!(report.params.uniform_blocks().count(), 1);
}

#[test]
fn fragment_program_reflects_texture_and_sampler() {
    let gpu = gpu();
    let handle = gpu
        .submit(desc("Sprite", StageKind::Fragment, SPRITE_FRAG))
        .unwrap();
    let report = handle.wait().unwrap();

    assert!(report.is_compiled(), "{:?}", report.error);
    assert!(report.vertex_declaration.is_none());

    let texture = report.params.find("u_texture").unwrap();
    assert_eq!(
        texture.kind,
        ParamKind::Texture {
            dim: TextureViewDimension::D2,
            depth: false
        }
    );
    assert_eq!(texture.binding, 0);

    let sampler = report.params.find("u_sampler").unwrap();
    assert_eq!(sampler.kind, ParamKind::Sampler { comparison: false });
    assert_eq!(sampler.binding, 1);
}

#[test]
fn geometry_programs_are_unsupported() {
    let gpu = gpu();
    let handle = gpu
        .submit(desc("Expand", StageKind::Geometry, "void main() {}"))
        .unwrap();
    let report = handle.wait().unwrap();

    assert_eq!(report.state, ProgramState::Failed);
    assert_eq!(report.error.as_deref(), Some(UNSUPPORTED_PROGRAM_MESSAGE));
}

#[test]
fn syntax_errors_fail_with_info_log() {
    let gpu = gpu();
    let handle = gpu
        .submit(desc("Broken", StageKind::Fragment, "void main() { this is not glsl }\n"))
        .unwrap();
    let report = handle.wait().unwrap();

    assert_eq!(report.state, ProgramState::Failed);
    let error = report.error.as_deref().unwrap();
    assert!(error.starts_with("Compile and linker info log: \n"));
    assert!(error.len() > "Compile and linker info log: \n".len());
    assert!(report.params.is_empty());
}

#[test]
fn dropped_handles_destroy_their_programs() {
    let gpu = gpu();
    let compiled = gpu.submit(desc("Sprite", StageKind::Fragment, SPRITE_FRAG)).unwrap();
    let failed = gpu.submit(desc("Empty", StageKind::Vertex, "")).unwrap();
    gpu.wait_idle().unwrap();

    let live = gpu.stats().unwrap();
    assert_eq!(live.programs_created, 2);
    assert_eq!(live.live_programs(), 2);

    drop(compiled);
    drop(failed);

    let after = gpu.stats().unwrap();
    assert_eq!(after.programs_destroyed, 2);
    assert_eq!(after.live_programs(), 0);
}

#[test]
fn resources_cache_programs_per_shader() {
    let gpu = gpu();
    let resources = Resources::new(std::env::temp_dir(), ResourceManifest::default());
    let shader = Resource::new(
        "Sprite.frag",
        ResourceData::Shader(ShaderSource {
            stage: StageKind::Fragment,
            source: SPRITE_FRAG.to_string(),
            includes: Vec::new(),
        }),
    );

    let first = resources.program(&gpu, &shader).unwrap();
    let second = resources.program(&gpu, &shader).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.wait().unwrap().is_compiled());
    assert_eq!(gpu.stats().unwrap().programs_created, 1);
}
