use crate::rendering::program::{ProgramDesc, ProgramReport, RenderStats};
use crossbeam_channel::Sender;
use std::fmt::{Debug, Formatter};

pub type ProgramId = u64;

pub enum GpuMsg {
    Compile {
        id: ProgramId,
        desc: ProgramDesc,
        reply: Sender<ProgramReport>,
    },
    Destroy(ProgramId),
    /// Answered once every message queued before it was handled.
    Fence(Sender<()>),
    Stats(Sender<RenderStats>),
    Shutdown,
}

impl Debug for GpuMsg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name: &str = match self {
            GpuMsg::Compile { id, desc, .. } => &format!("Compile {} #{id}", desc.name),
            GpuMsg::Destroy(id) => &format!("Destroy #{id}"),
            GpuMsg::Fence(_) => "Fence",
            GpuMsg::Stats(_) => "Stats",
            GpuMsg::Shutdown => "Shutdown",
        };

        write!(f, "{name}")
    }
}
