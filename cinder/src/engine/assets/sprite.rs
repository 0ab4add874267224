use crate::engine::assets::ResourceId;
use serde::{Deserialize, Serialize};

/// A region of a texture resource, referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteTexture {
    pub texture: ResourceId,
    pub uv_offset: [f32; 2],
    pub uv_scale: [f32; 2],
}

impl SpriteTexture {
    /// A sprite covering the whole texture.
    pub fn full(texture: ResourceId) -> Self {
        Self {
            texture,
            uv_offset: [0.0, 0.0],
            uv_scale: [1.0, 1.0],
        }
    }
}
