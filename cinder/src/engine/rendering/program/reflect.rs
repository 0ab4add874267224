use wgpu::{TextureViewDimension, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Float,
    Int,
    UInt,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Scalar(ScalarType),
    Vector { size: u8, scalar: ScalarType },
    Matrix { columns: u8, rows: u8 },
    Array,
    Struct,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// A whole uniform block. Its members are listed as separate [`ParamKind::Data`] entries.
    UniformBlock { size: u32 },
    /// A member of the uniform block named `block`.
    Data {
        block: String,
        offset: u32,
        ty: ParamType,
    },
    Texture { dim: TextureViewDimension, depth: bool },
    StorageTexture { dim: TextureViewDimension },
    Sampler { comparison: bool },
    StorageBuffer { read_only: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDesc {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub kind: ParamKind,
}

/// Everything a material can bind to a program, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamDescriptors {
    params: Vec<ParamDesc>,
}

impl ParamDescriptors {
    pub fn new(params: Vec<ParamDesc>) -> Self {
        Self { params }
    }

    pub fn push(&mut self, param: ParamDesc) {
        self.params.push(param);
    }

    pub fn find(&self, name: &str) -> Option<&ParamDesc> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamDesc> {
        self.params.iter()
    }

    pub fn textures(&self) -> impl Iterator<Item = &ParamDesc> {
        self.params
            .iter()
            .filter(|p| matches!(p.kind, ParamKind::Texture { .. }))
    }

    pub fn uniform_blocks(&self) -> impl Iterator<Item = &ParamDesc> {
        self.params
            .iter()
            .filter(|p| matches!(p.kind, ParamKind::UniformBlock { .. }))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexElement {
    pub name: String,
    pub location: u32,
    pub format: VertexFormat,
}

/// Vertex input layout of a vertex program, packed tightly into a single buffer in
/// location order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexDeclaration {
    elements: Vec<VertexElement>,
    attributes: Vec<VertexAttribute>,
    stride: u64,
}

impl VertexDeclaration {
    pub fn from_elements(mut elements: Vec<VertexElement>) -> Self {
        elements.sort_by_key(|e| e.location);

        let mut offset = 0;
        let attributes = elements
            .iter()
            .map(|e| {
                let attribute = VertexAttribute {
                    format: e.format,
                    offset,
                    shader_location: e.location,
                };
                offset += e.format.size();
                attribute
            })
            .collect();

        Self {
            elements,
            attributes,
            stride: offset,
        }
    }

    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    pub fn element(&self, name: &str) -> Option<&VertexElement> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn layout(&self) -> VertexBufferLayout<'_> {
        VertexBufferLayout {
            array_stride: self.stride,
            step_mode: VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_packs_in_location_order() {
        let decl = VertexDeclaration::from_elements(vec![
            VertexElement {
                name: "a_uv".to_string(),
                location: 1,
                format: VertexFormat::Float32x2,
            },
            VertexElement {
                name: "a_position".to_string(),
                location: 0,
                format: VertexFormat::Float32x3,
            },
        ]);

        let offsets: Vec<_> = decl.attributes().iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12]);
        assert_eq!(decl.stride(), 20);
        assert_eq!(decl.layout().attributes.len(), 2);
        assert_eq!(decl.elements()[0].name, "a_position");
    }

    #[test]
    fn find_by_name() {
        let params = ParamDescriptors::new(vec![ParamDesc {
            name: "mainTexture".to_string(),
            group: 0,
            binding: 1,
            kind: ParamKind::Texture {
                dim: TextureViewDimension::D2,
                depth: false,
            },
        }]);

        assert_eq!(params.find("mainTexture").map(|p| p.binding), Some(1));
        assert!(params.find("tint").is_none());
        assert_eq!(params.textures().count(), 1);
    }
}
