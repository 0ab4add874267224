use super::*;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct MockLog {
    created: Vec<(StageKind, String)>,
    deleted: Vec<NativeProgram>,
}

/// Scripted backend: every program gets the configured outcome.
struct MockBackend {
    caps: ShaderCapabilities,
    queued_errors: Vec<String>,
    linked: bool,
    info_log: String,
    log: Arc<Mutex<MockLog>>,
    next: u32,
}

impl MockBackend {
    fn new() -> (Self, Arc<Mutex<MockLog>>) {
        let log = Arc::new(Mutex::new(MockLog::default()));
        let backend = Self {
            caps: ShaderCapabilities::all(),
            queued_errors: Vec::new(),
            linked: true,
            info_log: String::new(),
            log: log.clone(),
            next: 0,
        };
        (backend, log)
    }
}

impl ProgramBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn profile_supported(&self, profile: &str) -> bool {
        profile == GLSL_PROFILE
    }

    fn capabilities(&self) -> ShaderCapabilities {
        self.caps
    }

    fn create_program(&mut self, stage: StageKind, source: &str) -> NativeProgram {
        self.log
            .lock()
            .unwrap()
            .created
            .push((stage, source.to_string()));
        self.next += 1;
        NativeProgram(self.next)
    }

    fn drain_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.queued_errors)
    }

    fn link_status(&self, _program: NativeProgram) -> bool {
        self.linked
    }

    fn info_log(&self, _program: NativeProgram) -> String {
        self.info_log.clone()
    }

    fn reflect_parameters(&self, _program: NativeProgram) -> ParamDescriptors {
        ParamDescriptors::new(vec![ParamDesc {
            name: "tint".to_string(),
            group: 0,
            binding: 0,
            kind: ParamKind::Data {
                block: "Material".to_string(),
                offset: 0,
                ty: ParamType::Vector {
                    size: 4,
                    scalar: ScalarType::Float,
                },
            },
        }])
    }

    fn reflect_vertex_input(&self, _program: NativeProgram) -> Vec<VertexElement> {
        vec![VertexElement {
            name: "a_position".to_string(),
            location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }]
    }

    fn delete_program(&mut self, program: NativeProgram) {
        self.log.lock().unwrap().deleted.push(program);
    }
}

fn desc(stage: StageKind, source: &str) -> ProgramDesc {
    ProgramDesc::builder()
        .name("Test")
        .stage(stage)
        .source(source)
        .build()
}

#[test]
fn version_line_is_injected() {
    let (backend, log) = MockBackend::new();
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());
    let mut unit = ProgramUnit::new(desc(StageKind::Fragment, "void main() {}\n"));

    unit.initialize(&mut ctx);

    let expected = "#version 450\n#define OPENGL\nvoid main() {}\n";
    assert_eq!(unit.state(), ProgramState::Compiled);
    assert_eq!(unit.effective_source(), Some(expected));
    assert_eq!(log.lock().unwrap().created[0].1, expected);
}

#[test]
fn failed_link_carries_info_log() {
    let (mut backend, log) = MockBackend::new();
    backend.linked = false;
    backend.info_log = "0:3: 'foo' : undeclared identifier".to_string();
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());
    let mut unit = ProgramUnit::new(desc(StageKind::Vertex, "void main() { foo; }"));

    unit.initialize(&mut ctx);

    assert_eq!(unit.state(), ProgramState::Failed);
    let error = unit.error().unwrap();
    assert!(error.contains("Compile and linker info log: \n"));
    assert!(error.ends_with("0:3: 'foo' : undeclared identifier"));
    assert!(unit.params().is_empty());
    assert!(unit.vertex_declaration().is_none());
    assert_eq!(log.lock().unwrap().deleted, vec![NativeProgram(1)]);
}

#[test]
fn queued_errors_fail_and_chain() {
    let (mut backend, _log) = MockBackend::new();
    backend.queued_errors = vec!["first".to_string(), "second".to_string()];
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());
    let mut unit = ProgramUnit::new(desc(StageKind::Fragment, "void main() {}"));

    unit.initialize(&mut ctx);

    assert_eq!(unit.state(), ProgramState::Failed);
    assert_eq!(
        unit.error(),
        Some("first\nPrevious errors: \nsecond\n")
    );
}

#[test]
fn failed_link_with_empty_log_has_no_log_header() {
    let (mut backend, _log) = MockBackend::new();
    backend.linked = false;
    backend.queued_errors = vec!["invalid operation".to_string()];
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());
    let mut unit = ProgramUnit::new(desc(StageKind::Fragment, "void main() {}"));

    unit.initialize(&mut ctx);

    assert_eq!(unit.state(), ProgramState::Failed);
    assert_eq!(unit.error(), Some("invalid operation\n"));
}

#[test]
fn non_empty_log_fails_even_when_linked() {
    let (mut backend, _log) = MockBackend::new();
    backend.info_log = "warning: precision".to_string();
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());
    let mut unit = ProgramUnit::new(desc(StageKind::Fragment, "void main() {}"));

    unit.initialize(&mut ctx);

    assert_eq!(unit.state(), ProgramState::Failed);
}

#[test]
fn unsupported_stage_never_reaches_backend() {
    let (mut backend, log) = MockBackend::new();
    backend.caps = ShaderCapabilities::VERTEX | ShaderCapabilities::FRAGMENT;
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());
    let mut unit = ProgramUnit::new(desc(StageKind::Geometry, "void main() {}"));

    unit.initialize(&mut ctx);

    assert_eq!(unit.state(), ProgramState::Failed);
    assert_eq!(unit.error(), Some(UNSUPPORTED_PROGRAM_MESSAGE));
    assert!(unit.debug_index().is_none());
    assert!(log.lock().unwrap().created.is_empty());
    assert_eq!(ctx.stats().programs_created, 1);
}

#[test]
fn unknown_profile_is_unsupported() {
    let (backend, _log) = MockBackend::new();
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());
    let desc = ProgramDesc::builder()
        .name("Hlsl")
        .stage(StageKind::Fragment)
        .source("float4 main() : SV_Target { return 0; }")
        .profile("hlsl")
        .build();
    let mut unit = ProgramUnit::new(desc);

    unit.initialize(&mut ctx);

    assert_eq!(unit.error(), Some(UNSUPPORTED_PROGRAM_MESSAGE));
}

#[test]
fn empty_source_fails() {
    let (backend, log) = MockBackend::new();
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());
    let mut unit = ProgramUnit::new(desc(StageKind::Vertex, "  \n"));

    unit.initialize(&mut ctx);

    assert_eq!(unit.error(), Some(EMPTY_SOURCE_MESSAGE));
    assert!(log.lock().unwrap().created.is_empty());
}

#[test]
fn second_initialize_is_ignored() {
    let (backend, log) = MockBackend::new();
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());
    let mut unit = ProgramUnit::new(desc(StageKind::Fragment, "void main() {}"));

    unit.initialize(&mut ctx);
    unit.initialize(&mut ctx);

    assert_eq!(log.lock().unwrap().created.len(), 1);
    assert_eq!(ctx.stats().programs_created, 1);
    assert_eq!(unit.debug_index(), Some(1));
}

#[test]
fn debug_indices_count_per_stage() {
    let (backend, _log) = MockBackend::new();
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());

    let mut indices = Vec::new();
    for stage in [StageKind::Vertex, StageKind::Fragment, StageKind::Vertex] {
        let mut unit = ProgramUnit::new(desc(stage, "void main() {}"));
        unit.initialize(&mut ctx);
        indices.push(unit.debug_index());
    }

    assert_eq!(indices, vec![Some(1), Some(1), Some(2)]);
    assert_eq!(ctx.counters().get(StageKind::Vertex), 2);
}

#[test]
fn vertex_programs_reflect_inputs() {
    let (backend, _log) = MockBackend::new();
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());
    let mut vertex = ProgramUnit::new(desc(StageKind::Vertex, "void main() {}"));
    let mut fragment = ProgramUnit::new(desc(StageKind::Fragment, "void main() {}"));

    vertex.initialize(&mut ctx);
    fragment.initialize(&mut ctx);

    let decl = vertex.vertex_declaration().unwrap();
    assert_eq!(decl.stride(), 12);
    assert!(fragment.vertex_declaration().is_none());
    assert!(fragment.params().find("tint").is_some());
}

#[test]
fn destroy_releases_only_compiled_units() {
    let (mut backend, log) = MockBackend::new();
    backend.caps = ShaderCapabilities::FRAGMENT;
    let mut ctx = DeviceContext::new(backend, CompilerConfig::default());

    let mut compiled = ProgramUnit::new(desc(StageKind::Fragment, "void main() {}"));
    let mut unsupported = ProgramUnit::new(desc(StageKind::Compute, "void main() {}"));
    compiled.initialize(&mut ctx);
    unsupported.initialize(&mut ctx);
    let handle = compiled.handle();

    compiled.destroy(&mut ctx);
    unsupported.destroy(&mut ctx);

    assert_eq!(log.lock().unwrap().deleted, vec![handle]);
    let stats = ctx.stats();
    assert_eq!(stats.programs_created, 2);
    assert_eq!(stats.programs_destroyed, 2);
    assert_eq!(stats.live_programs(), 0);
}
