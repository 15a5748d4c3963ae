//! Vertex and instance layouts for the block renderer.
//!
//! Every block is the same unit cube, so the mesh is uploaded once and drawn instanced: the
//! vertex buffer holds the 24 cube corners (four per face, so each face gets its own normal
//! and texture coordinates) and the instance buffer holds one [`InstanceRaw`] per block.

use cgmath::{Point3, Vector3};

use super::atlas::UvRect;

/// A corner of the shared cube mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Normal: [f32; 3] (12 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    position: [f32; 3],
    tex_coords: [f32; 2],
    normal: [f32; 3],
}

impl CubeVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3];

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: tex_coords (vec2<f32>)
    /// - `location = 2`: normal (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-instance data: where the cube goes, how large it is, and how opaque.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    offset: [f32; 3],
    scale: f32,
    opacity: f32,
}

impl InstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![3 => Float32x3, 4 => Float32, 5 => Float32];

    pub fn new(offset: Point3<f32>, scale: f32, opacity: f32) -> Self {
        Self {
            offset: offset.into(),
            scale,
            opacity,
        }
    }

    /// # Shader Attributes
    /// - `location = 3`: offset (vec3<f32>)
    /// - `location = 4`: scale (f32)
    /// - `location = 5`: opacity (f32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Outward normal plus the two in-face axes, ordered so `u × v` equals the normal and the
/// faces wind counter-clockwise seen from outside.
const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

/// Face corners as `(s, t)`: bottom-left, bottom-right, top-left, top-right.
const CORNERS: [(f32, f32); 4] = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];

/// Builds a unit cube centred on the origin with every face showing `uv`.
pub fn cube_mesh(uv: &UvRect) -> (Vec<CubeVertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(FACES.len() * CORNERS.len());
    let mut indices = Vec::with_capacity(FACES.len() * 6);

    for (normal, u_axis, v_axis) in FACES {
        let base = vertices.len() as u16;
        let (normal, u_axis, v_axis) = (
            Vector3::from(normal),
            Vector3::from(u_axis),
            Vector3::from(v_axis),
        );

        for (s, t) in CORNERS {
            let position = normal * 0.5 + u_axis * (s - 0.5) + v_axis * (t - 0.5);
            vertices.push(CubeVertex {
                position: position.into(),
                tex_coords: uv.texture_coords(s, t),
                normal: normal.into(),
            });
        }

        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    #[test]
    fn cube_has_four_corners_and_two_triangles_per_face() {
        let (vertices, indices) = cube_mesh(&UvRect::for_cell(19, 6));
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn corners_lie_on_the_unit_cube() {
        let (vertices, _) = cube_mesh(&UvRect::for_cell(0, 0));
        for vertex in &vertices {
            for component in vertex.position {
                assert!((component.abs() - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let (vertices, indices) = cube_mesh(&UvRect::for_cell(0, 0));
        for triangle in indices.chunks(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]]
                .map(|i| Vector3::from(vertices[i as usize].position));
            let facing = (b - a).cross(c - a).normalize();
            let normal = Vector3::from(vertices[triangle[0] as usize].normal);
            assert!((facing - normal).magnitude() < 1e-5);
        }
    }
}
