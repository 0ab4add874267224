use crate::rendering::message::{GpuMsg, ProgramId};
use crate::rendering::program::{
    CompilerConfig, DeviceContext, ProgramBackend, ProgramDesc, ProgramReport, ProgramUnit,
    RenderStats,
};
use crossbeam_channel::{Receiver, RecvError, Sender, TryRecvError, bounded, unbounded};
use log::{debug, trace, warn};
use snafu::{ResultExt, Snafu};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum GpuThreadError {
    #[snafu(display("Failed to spawn the GPU thread: {source}"))]
    Spawn { source: std::io::Error },

    #[snafu(display("The GPU thread is no longer running"))]
    Disconnected,
}

/// Dedicated thread owning the program backend.
///
/// All compilation happens here. Callers only ever see [`ProgramHandle`]s and the
/// [`ProgramReport`]s they resolve to.
pub struct GpuThread {
    tx: Sender<GpuMsg>,
    thread: Option<JoinHandle<()>>,
    next_id: AtomicU64,
}

struct GpuThreadInner<B: ProgramBackend> {
    ctx: DeviceContext<B>,
    units: HashMap<ProgramId, ProgramUnit>,
    rx: Receiver<GpuMsg>,
}

impl GpuThread {
    pub fn spawn<B: ProgramBackend>(
        backend: B,
        config: CompilerConfig,
    ) -> Result<Self, GpuThreadError> {
        let (tx, rx) = unbounded();
        let backend_name = backend.name().to_string();

        let thread = std::thread::Builder::new()
            .name("cinder-gpu".to_string())
            .spawn(move || {
                GpuThreadInner {
                    ctx: DeviceContext::new(backend, config),
                    units: HashMap::new(),
                    rx,
                }
                .run();

                debug!("[GPU] Thread exited");
            })
            .context(SpawnErr)?;

        debug!("[GPU] Started with the {backend_name} backend");

        Ok(GpuThread {
            tx,
            thread: Some(thread),
            next_id: AtomicU64::new(1),
        })
    }

    /// Queues a program for compilation.
    pub fn submit(&self, desc: ProgramDesc) -> Result<ProgramHandle, GpuThreadError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = desc.name.clone();
        let (reply, rx) = bounded(1);

        self.tx
            .send(GpuMsg::Compile { id, desc, reply })
            .map_err(|_| GpuThreadError::Disconnected)?;

        Ok(ProgramHandle {
            id,
            name,
            rx,
            report: OnceLock::new(),
            tx: self.tx.clone(),
        })
    }

    /// Blocks until every message submitted before this call has been processed.
    pub fn wait_idle(&self) -> Result<(), GpuThreadError> {
        let (tx, rx) = bounded(1);
        self.tx
            .send(GpuMsg::Fence(tx))
            .map_err(|_| GpuThreadError::Disconnected)?;
        rx.recv().map_err(|_| GpuThreadError::Disconnected)
    }

    pub fn stats(&self) -> Result<RenderStats, GpuThreadError> {
        let (tx, rx) = bounded(1);
        self.tx
            .send(GpuMsg::Stats(tx))
            .map_err(|_| GpuThreadError::Disconnected)?;
        rx.recv().map_err(|_| GpuThreadError::Disconnected)
    }
}

impl Drop for GpuThread {
    fn drop(&mut self) {
        let _ = self.tx.send(GpuMsg::Shutdown);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("[GPU] Thread panicked during shutdown");
        }
    }
}

impl<B: ProgramBackend> GpuThreadInner<B> {
    fn run(mut self) {
        loop {
            let msg = match self.rx.recv() {
                Ok(msg) => msg,
                Err(RecvError) => {
                    debug!("[GPU] All senders are gone");
                    break;
                }
            };

            trace!("[GPU] {msg:?}");
            if !self.handle(msg) {
                break;
            }
        }

        self.destroy_all();
    }

    fn handle(&mut self, msg: GpuMsg) -> bool {
        match msg {
            GpuMsg::Compile { id, desc, reply } => {
                let mut unit = ProgramUnit::new(desc);
                unit.initialize(&mut self.ctx);
                // the handle may already be gone, the unit is still tracked until destroyed
                let _ = reply.send(unit.report());
                self.units.insert(id, unit);
            }
            GpuMsg::Destroy(id) => match self.units.remove(&id) {
                Some(unit) => unit.destroy(&mut self.ctx),
                None => warn!("[GPU] Tried to destroy unknown program #{id}"),
            },
            GpuMsg::Fence(done) => {
                let _ = done.send(());
            }
            GpuMsg::Stats(reply) => {
                let _ = reply.send(self.ctx.stats());
            }
            GpuMsg::Shutdown => return false,
        }
        true
    }

    fn destroy_all(&mut self) {
        let remaining = self.units.len();
        for (_, unit) in self.units.drain() {
            unit.destroy(&mut self.ctx);
        }
        if remaining > 0 {
            debug!("[GPU] Destroyed {remaining} remaining programs on shutdown");
        }
    }
}

/// A program queued on the [`GpuThread`]. Dropping it destroys the program.
#[derive(Debug)]
pub struct ProgramHandle {
    id: ProgramId,
    name: String,
    rx: Receiver<ProgramReport>,
    report: OnceLock<Result<ProgramReport, RecvError>>,
    tx: Sender<GpuMsg>,
}

impl ProgramHandle {
    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blocks until the program was compiled.
    pub fn wait(&self) -> Result<&ProgramReport, GpuThreadError> {
        self.report
            .get_or_init(|| self.rx.recv())
            .as_ref()
            .map_err(|_| GpuThreadError::Disconnected)
    }

    /// The report, if compilation already finished.
    pub fn try_report(&self) -> Option<&ProgramReport> {
        if self.report.get().is_none() {
            let result = match self.rx.try_recv() {
                Ok(report) => Ok(report),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => Err(RecvError),
            };
            let _ = self.report.set(result);
        }
        self.report.get()?.as_ref().ok()
    }
}

impl Drop for ProgramHandle {
    fn drop(&mut self) {
        let _ = self.tx.send(GpuMsg::Destroy(self.id));
    }
}
