//! Shader program compilation on a dedicated GPU thread.
//!
//! The [`GpuThread`] owns a [`ProgramBackend`](program::ProgramBackend) and the
//! [`DeviceContext`](program::DeviceContext) around it. Everything else talks to it through
//! [`GpuMsg`]s and gets a [`ProgramHandle`] back, which resolves to a
//! [`ProgramReport`](program::ProgramReport) once the program was compiled.
//!
//! ```rust
//! use cinder::rendering::GpuThread;
//! use cinder::rendering::program::{CompilerConfig, NagaBackend, ProgramDesc, StageKind};
//!
//! let gpu = GpuThread::spawn(NagaBackend::new(), CompilerConfig::default()).unwrap();
//! let desc = ProgramDesc::builder()
//!     .name("Fill")
//!     .stage(StageKind::Fragment)
//!     .source("layout(location = 0) out vec4 color;\nvoid main() { color = vec4(1.0); }\n")
//!     .build();
//!
//! let handle = gpu.submit(desc).unwrap();
//! assert!(handle.wait().unwrap().is_compiled());
//! ```

mod gpu_thread;
pub mod message;
pub mod program;

pub use gpu_thread::*;
pub use message::*;
