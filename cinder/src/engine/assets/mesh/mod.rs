mod shapes;

pub use shapes::BuiltinMesh;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::mem::size_of;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Indexed triangle list. Vertex and index data are stored as the artifact's bulk payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(skip)]
    pub vertices: Vec<MeshVertex>,
    #[serde(skip)]
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    // layout: [vertex count: u32 LE][vertices][indices: u32 LE]
    pub(crate) fn to_bulk(&self) -> Vec<u8> {
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&self.vertices);
        let mut bulk = Vec::with_capacity(4 + vertex_bytes.len() + self.indices.len() * 4);
        bulk.extend_from_slice(&(self.vertices.len() as u32).to_le_bytes());
        bulk.extend_from_slice(vertex_bytes);
        for index in &self.indices {
            bulk.extend_from_slice(&index.to_le_bytes());
        }
        bulk
    }

    pub(crate) fn restore_bulk(&mut self, bulk: &[u8]) -> Result<(), String> {
        let Some((count, rest)) = bulk.split_first_chunk::<4>() else {
            return Err("mesh payload is missing its vertex count".to_string());
        };
        let count = u32::from_le_bytes(*count) as usize;
        let Some(vertex_len) = count.checked_mul(size_of::<MeshVertex>()) else {
            return Err(format!("mesh payload claims {count} vertices"));
        };
        if rest.len() < vertex_len || (rest.len() - vertex_len) % 4 != 0 {
            return Err(format!(
                "mesh payload of {} bytes does not fit {count} vertices",
                bulk.len()
            ));
        }

        let (vertex_bytes, index_bytes) = rest.split_at(vertex_len);
        self.vertices = vertex_bytes
            .chunks_exact(size_of::<MeshVertex>())
            .map(bytemuck::pod_read_unaligned::<MeshVertex>)
            .collect();
        self.indices = index_bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(format!("index {bad} is out of range for {count} vertices"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_bulk_is_rejected() {
        let mesh = BuiltinMesh::Quad.generate();
        let mut bulk = mesh.to_bulk();
        bulk.truncate(bulk.len() - 30);

        let mut restored = Mesh::default();
        assert!(restored.restore_bulk(&bulk).is_err());
    }

    #[test]
    fn bulk_restores_generated_box() {
        let mesh = BuiltinMesh::Box.generate();
        let mut restored = Mesh::default();
        restored.restore_bulk(&mesh.to_bulk()).unwrap();
        assert_eq!(restored, mesh);
    }
}
