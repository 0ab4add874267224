use crate::rendering::program::{ParamDescriptors, ShaderCapabilities, StageKind, VertexElement};

/// Handle of a program object owned by a [`ProgramBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeProgram(pub u32);

impl NativeProgram {
    pub const NULL: NativeProgram = NativeProgram(0);

    #[inline]
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

/// The native shading-language compiler a [`ProgramUnit`](super::ProgramUnit) talks to.
///
/// The calls mirror a classic program-object API: creating a program compiles and links it
/// in one go, failures show up in the link status and the info log, and API misuse is
/// reported through an error queue that has to be drained by the caller.
pub trait ProgramBackend: Send + 'static {
    fn name(&self) -> &str;

    fn profile_supported(&self, profile: &str) -> bool;

    fn capabilities(&self) -> ShaderCapabilities;

    /// Compiles and links `source` as a single-stage program.
    fn create_program(&mut self, stage: StageKind, source: &str) -> NativeProgram;

    /// Returns and clears every error queued since the last call.
    fn drain_errors(&mut self) -> Vec<String>;

    fn link_status(&self, program: NativeProgram) -> bool;

    fn info_log(&self, program: NativeProgram) -> String;

    fn reflect_parameters(&self, program: NativeProgram) -> ParamDescriptors;

    fn reflect_vertex_input(&self, program: NativeProgram) -> Vec<VertexElement>;

    fn delete_program(&mut self, program: NativeProgram);
}

impl<B: ProgramBackend + ?Sized> ProgramBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn profile_supported(&self, profile: &str) -> bool {
        (**self).profile_supported(profile)
    }

    fn capabilities(&self) -> ShaderCapabilities {
        (**self).capabilities()
    }

    fn create_program(&mut self, stage: StageKind, source: &str) -> NativeProgram {
        (**self).create_program(stage, source)
    }

    fn drain_errors(&mut self) -> Vec<String> {
        (**self).drain_errors()
    }

    fn link_status(&self, program: NativeProgram) -> bool {
        (**self).link_status(program)
    }

    fn info_log(&self, program: NativeProgram) -> String {
        (**self).info_log(program)
    }

    fn reflect_parameters(&self, program: NativeProgram) -> ParamDescriptors {
        (**self).reflect_parameters(program)
    }

    fn reflect_vertex_input(&self, program: NativeProgram) -> Vec<VertexElement> {
        (**self).reflect_vertex_input(program)
    }

    fn delete_program(&mut self, program: NativeProgram) {
        (**self).delete_program(program)
    }
}
