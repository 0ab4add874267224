pub mod assets;
pub mod build;
pub mod import;
pub mod rendering;
pub mod resources;

pub use resources::*;
