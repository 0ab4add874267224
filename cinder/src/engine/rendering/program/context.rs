use crate::rendering::program::{CompilerConfig, ProgramBackend, StageKind};

/// Number of programs created and destroyed over the lifetime of a [`DeviceContext`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub programs_created: u64,
    pub programs_destroyed: u64,
}

impl RenderStats {
    pub fn live_programs(&self) -> u64 {
        self.programs_created.saturating_sub(self.programs_destroyed)
    }
}

/// Debug counters, one per stage kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageCounters {
    counts: [u32; StageKind::COUNT],
}

impl StageCounters {
    /// Bumps the counter of `stage` and returns its new value.
    pub fn next(&mut self, stage: StageKind) -> u32 {
        let slot = &mut self.counts[stage.index()];
        *slot += 1;
        *slot
    }

    pub fn get(&self, stage: StageKind) -> u32 {
        self.counts[stage.index()]
    }
}

/// Owns the backend together with the bookkeeping every program unit reports into.
/// Lives on the GPU thread.
pub struct DeviceContext<B: ProgramBackend> {
    backend: B,
    config: CompilerConfig,
    counters: StageCounters,
    stats: RenderStats,
}

impl<B: ProgramBackend> DeviceContext<B> {
    pub fn new(backend: B, config: CompilerConfig) -> Self {
        Self {
            backend,
            config,
            counters: StageCounters::default(),
            stats: RenderStats::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn counters(&self) -> &StageCounters {
        &self.counters
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub(crate) fn next_debug_index(&mut self, stage: StageKind) -> u32 {
        self.counters.next(stage)
    }

    pub(crate) fn record_created(&mut self) {
        self.stats.programs_created += 1;
    }

    pub(crate) fn record_destroyed(&mut self) {
        self.stats.programs_destroyed += 1;
    }
}
