#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
pub mod engine;
pub mod utils;

pub use engine::*;

pub use ::log;
pub use ::naga;
pub use ::wgpu;
