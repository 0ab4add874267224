use crate::engine::assets::{Font, Mesh, ShaderInclude, ShaderSource, SpriteTexture, Texture};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable, opaque identifier of a resource. Survives reimports of the same source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(Uuid);

impl ResourceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    ShaderInclude,
    Shader,
    Font,
    SpriteTexture,
    Mesh,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Texture => "Texture",
            ResourceKind::ShaderInclude => "Shader Include",
            ResourceKind::Shader => "Shader",
            ResourceKind::Font => "Font",
            ResourceKind::SpriteTexture => "Sprite Texture",
            ResourceKind::Mesh => "Mesh",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum ResourceData {
    Texture(Texture),
    ShaderInclude(ShaderInclude),
    Shader(ShaderSource),
    Font(Font),
    SpriteTexture(SpriteTexture),
    Mesh(Mesh),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub data: ResourceData,
}

impl Resource {
    pub fn new<S: Into<String>>(name: S, data: ResourceData) -> Self {
        Self {
            id: ResourceId::new(),
            name: name.into(),
            data,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.data.kind()
    }

    pub fn as_texture(&self) -> Option<&Texture> {
        match &self.data {
            ResourceData::Texture(tex) => Some(tex),
            _ => None,
        }
    }

    pub fn as_shader(&self) -> Option<&ShaderSource> {
        match &self.data {
            ResourceData::Shader(shader) => Some(shader),
            _ => None,
        }
    }

    pub fn as_shader_include(&self) -> Option<&ShaderInclude> {
        match &self.data {
            ResourceData::ShaderInclude(include) => Some(include),
            _ => None,
        }
    }

    pub fn as_font(&self) -> Option<&Font> {
        match &self.data {
            ResourceData::Font(font) => Some(font),
            _ => None,
        }
    }

    pub fn as_sprite(&self) -> Option<&SpriteTexture> {
        match &self.data {
            ResourceData::SpriteTexture(sprite) => Some(sprite),
            _ => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.data {
            ResourceData::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

impl ResourceData {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceData::Texture(_) => ResourceKind::Texture,
            ResourceData::ShaderInclude(_) => ResourceKind::ShaderInclude,
            ResourceData::Shader(_) => ResourceKind::Shader,
            ResourceData::Font(_) => ResourceKind::Font,
            ResourceData::SpriteTexture(_) => ResourceKind::SpriteTexture,
            ResourceData::Mesh(_) => ResourceKind::Mesh,
        }
    }

    /// Other resources this one points at by id.
    pub fn references(&self) -> Vec<ResourceId> {
        match self {
            ResourceData::Font(font) => font
                .bitmaps
                .iter()
                .flat_map(|bitmap| bitmap.pages.iter().copied())
                .collect(),
            ResourceData::SpriteTexture(sprite) => vec![sprite.texture],
            _ => Vec::new(),
        }
    }

    /// Rewrites every reference to `from` so it points at `to`.
    pub fn remap_reference(&mut self, from: ResourceId, to: ResourceId) {
        match self {
            ResourceData::Font(font) => {
                for page in font.bitmaps.iter_mut().flat_map(|b| b.pages.iter_mut()) {
                    if *page == from {
                        *page = to;
                    }
                }
            }
            ResourceData::SpriteTexture(sprite) => {
                if sprite.texture == from {
                    sprite.texture = to;
                }
            }
            _ => {}
        }
    }

    /// The bulk bytes that are stored outside of the artifact header.
    pub(crate) fn bulk(&self) -> Vec<u8> {
        match self {
            ResourceData::Texture(tex) => tex.pixels.clone(),
            ResourceData::Mesh(mesh) => mesh.to_bulk(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn restore_bulk(&mut self, bulk: Vec<u8>) -> Result<(), String> {
        match self {
            ResourceData::Texture(tex) => {
                let Some(expected) = tex.byte_len() else {
                    return Err(format!(
                        "texture of {}x{} texels is too large",
                        tex.width, tex.height
                    ));
                };
                if bulk.len() != expected {
                    return Err(format!(
                        "texture payload is {} bytes, expected {expected}",
                        bulk.len()
                    ));
                }
                tex.pixels = bulk;
                Ok(())
            }
            ResourceData::Mesh(mesh) => mesh.restore_bulk(&bulk),
            _ if bulk.is_empty() => Ok(()),
            _ => Err(format!("unexpected {} byte payload", bulk.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::FontBitmap;

    #[test]
    fn remap_font_pages() {
        let old = ResourceId::new();
        let new = ResourceId::new();
        let keep = ResourceId::new();
        let mut data = ResourceData::Font(Font {
            family: "Test".to_string(),
            bitmaps: vec![FontBitmap {
                size: 11,
                line_height: 12.0,
                ascent: 9.0,
                descent: -3.0,
                glyphs: Vec::new(),
                pages: vec![old, keep],
            }],
        });

        data.remap_reference(old, new);

        assert_eq!(data.references(), vec![new, keep]);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(ResourceId::new(), ResourceId::new());
    }
}
