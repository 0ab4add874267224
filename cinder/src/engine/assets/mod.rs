//! Plain-old-data resources produced by the import pipeline.
//!
//! Everything in here is independent of GPU state. A [`Resource`] is what an importer
//! produces, what an artifact file stores and what [`Resources`](crate::Resources) hands
//! out at runtime. The [`ResourceManifest`] maps the stable [`ResourceId`] of every
//! artifact to the place it was written to.

pub mod artifact;
pub mod cursor;
pub mod font;
pub mod manifest;
pub mod mesh;
pub mod resource;
pub mod shader;
pub mod sprite;
pub mod texture;

pub use artifact::*;
pub use cursor::*;
pub use font::*;
pub use manifest::*;
pub use mesh::*;
pub use resource::*;
pub use shader::*;
pub use sprite::*;
pub use texture::*;
