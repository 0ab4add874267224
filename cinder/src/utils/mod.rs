pub mod checks;
pub mod fs;

pub use fs::*;
