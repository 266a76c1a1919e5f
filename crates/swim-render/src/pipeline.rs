use bytemuck::{Pod, Zeroable};
use swim_deform::TriangleMesh;
use swim_math::{Point2, Point3, Vector3};

/// Vertex with f32 data packed for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl GpuVertex {
    pub fn from_mesh_vertex(pos: Point3, normal: Vector3, uv: Point2) -> Self {
        Self {
            position: pos.as_vec3().to_array(),
            normal: normal.as_vec3().to_array(),
            uv: uv.as_vec2().to_array(),
        }
    }
}

/// Vertex and index data ready for upload.
///
/// Positions stay in the mesh's local frame when the deformation runs in the
/// vertex stage; [`RenderMesh::write_positions`] overwrites them for the CPU path.
#[derive(Debug, Clone)]
pub struct RenderMesh {
    pub vertices: Vec<GpuVertex>,
    pub indices: Vec<u32>,
}

impl RenderMesh {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Replace positions with world-space results from a CPU deformation pass.
    pub fn write_positions(&mut self, positions: &[Point3]) {
        for (v, p) in self.vertices.iter_mut().zip(positions) {
            v.position = p.as_vec3().to_array();
        }
    }
}

/// Convert a TriangleMesh to GPU-ready buffers.
pub fn prepare_mesh(mesh: &TriangleMesh) -> RenderMesh {
    let vertices = mesh
        .positions
        .iter()
        .enumerate()
        .map(|(i, &pos)| {
            let normal = mesh.normals.get(i).copied().unwrap_or(Vector3::Y);
            let uv = mesh.uvs.get(i).copied().unwrap_or(Point2::ZERO);
            GpuVertex::from_mesh_vertex(pos, normal, uv)
        })
        .collect();

    RenderMesh {
        vertices,
        indices: mesh.indices.clone(),
    }
}
