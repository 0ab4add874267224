use crate::engine::assets::{Mesh, MeshVertex};
use std::f32::consts::{PI, TAU};

const ROUND_SEGMENTS: u32 = 10;
const SPHERE_RINGS: u32 = 16;
const SPHERE_SEGMENTS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinMesh {
    Box,
    Sphere,
    Cone,
    Quad,
    Disc,
}

impl BuiltinMesh {
    pub const ALL: [BuiltinMesh; 5] = [
        BuiltinMesh::Box,
        BuiltinMesh::Sphere,
        BuiltinMesh::Cone,
        BuiltinMesh::Quad,
        BuiltinMesh::Disc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinMesh::Box => "Box",
            BuiltinMesh::Sphere => "Sphere",
            BuiltinMesh::Cone => "Cone",
            BuiltinMesh::Quad => "Quad",
            BuiltinMesh::Disc => "Disc",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.{}", self.name(), cinder_utils::ARTIFACT_EXTENSION)
    }

    pub fn generate(self) -> Mesh {
        match self {
            BuiltinMesh::Box => unit_box(),
            BuiltinMesh::Sphere => sphere(1.0),
            BuiltinMesh::Cone => cone(1.0, 1.0),
            BuiltinMesh::Quad => quad(),
            BuiltinMesh::Disc => disc(1.0),
        }
    }
}

fn unit_box() -> Mesh {
    // (normal, tangent u, tangent v) per face
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    const CORNERS: [(f32, f32); 4] = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (n, u, v) in FACES {
        let base = vertices.len() as u32;
        for (cu, cv) in CORNERS {
            let position = [
                n[0] * 0.5 + u[0] * cu + v[0] * cv,
                n[1] * 0.5 + u[1] * cu + v[1] * cv,
                n[2] * 0.5 + u[2] * cu + v[2] * cv,
            ];
            vertices.push(MeshVertex::new(position, n, [cu + 0.5, 0.5 - cv]));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(vertices, indices)
}

fn sphere(radius: f32) -> Mesh {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=SPHERE_RINGS {
        let v = ring as f32 / SPHERE_RINGS as f32;
        let theta = v * PI;
        for segment in 0..=SPHERE_SEGMENTS {
            let u = segment as f32 / SPHERE_SEGMENTS as f32;
            let phi = u * TAU;
            let normal = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
            let position = normal.map(|c| c * radius);
            vertices.push(MeshVertex::new(position, normal, [u, v]));
        }
    }

    let stride = SPHERE_SEGMENTS + 1;
    for ring in 0..SPHERE_RINGS {
        for segment in 0..SPHERE_SEGMENTS {
            let a = ring * stride + segment;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }

    Mesh::new(vertices, indices)
}

fn cone(radius: f32, height: f32) -> Mesh {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let slope = radius / height;

    // sides, one apex vertex per segment so every face keeps its own normal
    for segment in 0..ROUND_SEGMENTS {
        let a0 = segment as f32 / ROUND_SEGMENTS as f32 * TAU;
        let a1 = (segment + 1) as f32 / ROUND_SEGMENTS as f32 * TAU;
        let mid = (a0 + a1) * 0.5;
        let base = vertices.len() as u32;

        let side_normal = |a: f32| normalize([a.cos(), slope, a.sin()]);
        vertices.push(MeshVertex::new(
            [a0.cos() * radius, 0.0, a0.sin() * radius],
            side_normal(a0),
            [0.0, 1.0],
        ));
        vertices.push(MeshVertex::new([0.0, height, 0.0], side_normal(mid), [0.5, 0.0]));
        vertices.push(MeshVertex::new(
            [a1.cos() * radius, 0.0, a1.sin() * radius],
            side_normal(a1),
            [1.0, 1.0],
        ));
        indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    append_disc(&mut vertices, &mut indices, radius, -1.0);
    Mesh::new(vertices, indices)
}

fn quad() -> Mesh {
    const CORNERS: [([f32; 3], [f32; 2]); 4] = [
        ([-0.5, -0.5, 0.0], [0.0, 1.0]),
        ([0.5, -0.5, 0.0], [1.0, 1.0]),
        ([0.5, 0.5, 0.0], [1.0, 0.0]),
        ([-0.5, 0.5, 0.0], [0.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(8);
    for (position, uv) in CORNERS {
        vertices.push(MeshVertex::new(position, [0.0, 0.0, 1.0], uv));
    }
    for (position, uv) in CORNERS {
        vertices.push(MeshVertex::new(position, [0.0, 0.0, -1.0], uv));
    }

    // front and back face
    let indices = vec![0, 1, 2, 0, 2, 3, 4, 6, 5, 4, 7, 6];
    Mesh::new(vertices, indices)
}

fn disc(radius: f32) -> Mesh {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    append_disc(&mut vertices, &mut indices, radius, 1.0);
    Mesh::new(vertices, indices)
}

/// A fan in the XZ plane facing `facing` along Y.
fn append_disc(vertices: &mut Vec<MeshVertex>, indices: &mut Vec<u32>, radius: f32, facing: f32) {
    let normal = [0.0, facing, 0.0];
    let center = vertices.len() as u32;
    vertices.push(MeshVertex::new([0.0; 3], normal, [0.5, 0.5]));

    for segment in 0..ROUND_SEGMENTS {
        let a = segment as f32 / ROUND_SEGMENTS as f32 * TAU;
        let (x, z) = (a.cos(), a.sin());
        vertices.push(MeshVertex::new(
            [x * radius, 0.0, z * radius],
            normal,
            [x * 0.5 + 0.5, z * 0.5 + 0.5],
        ));
    }

    for segment in 0..ROUND_SEGMENTS {
        let current = center + 1 + segment;
        let next = center + 1 + (segment + 1) % ROUND_SEGMENTS;
        if facing > 0.0 {
            indices.extend_from_slice(&[center, next, current]);
        } else {
            indices.extend_from_slice(&[center, current, next]);
        }
    }
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len == 0.0 {
        return v;
    }
    v.map(|c| c / len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_meshes_are_valid_triangle_lists() {
        for mesh in BuiltinMesh::ALL {
            let generated = mesh.generate();
            assert!(generated.vertex_count() > 0, "{mesh:?} has no vertices");
            assert_eq!(generated.indices.len() % 3, 0, "{mesh:?} is not a triangle list");
            assert!(
                generated
                    .indices
                    .iter()
                    .all(|&i| (i as usize) < generated.vertex_count()),
                "{mesh:?} indexes past its vertices"
            );
        }
    }

    #[test]
    fn box_and_quad_sizes() {
        assert_eq!(BuiltinMesh::Box.generate().triangle_count(), 12);
        assert_eq!(BuiltinMesh::Quad.generate().vertex_count(), 8);
        assert_eq!(BuiltinMesh::Quad.generate().triangle_count(), 4);
    }

    #[test]
    fn sphere_normals_are_unit_length() {
        for v in BuiltinMesh::Sphere.generate().vertices {
            let n = v.normal;
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }
}
