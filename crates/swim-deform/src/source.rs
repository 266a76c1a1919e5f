//! Asynchronous mesh sources.
//!
//! A swimmer instance awaits its source before any deformation data is derived;
//! there is no partially loaded state.

use std::future::Future;
use std::path::PathBuf;

use swim_core::{Result, SwimError};
use swim_math::{Point2, Point3, Vector3};
use tracing::{info, instrument};

use crate::mesh::TriangleMesh;

pub trait MeshSource {
    /// Resolve to a complete mesh or an [`SwimError::AssetLoad`].
    fn load_mesh(&self) -> impl Future<Output = Result<TriangleMesh>> + Send;
}

/// A mesh that is already in memory.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    mesh: TriangleMesh,
}

impl InMemorySource {
    pub fn new(mesh: TriangleMesh) -> Self {
        Self { mesh }
    }
}

impl MeshSource for InMemorySource {
    async fn load_mesh(&self) -> Result<TriangleMesh> {
        if self.mesh.positions.is_empty() {
            return Err(SwimError::asset_load("in-memory mesh has no vertices"));
        }
        Ok(self.mesh.clone())
    }
}

/// First mesh primitive of a binary glTF file.
#[derive(Debug, Clone)]
pub struct GlbFileSource {
    pub path: PathBuf,
}

impl GlbFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MeshSource for GlbFileSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load_mesh(&self) -> Result<TriangleMesh> {
        let bytes = std::fs::read(&self.path)
            .map_err(|e| SwimError::asset_load(format!("{}: {}", self.path.display(), e)))?;
        let mesh = parse_glb(&bytes)?;
        info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "loaded glTF mesh"
        );
        Ok(mesh)
    }
}

/// Decode the first primitive that carries positions.
pub fn parse_glb(bytes: &[u8]) -> Result<TriangleMesh> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).map_err(|e| SwimError::asset_load(format!("invalid glTF: {}", e)))?;

    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|b| &b.0[..]));

            let positions: Vec<Point3> = match reader.read_positions() {
                Some(iter) => iter
                    .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64))
                    .collect(),
                None => continue,
            };
            if positions.is_empty() {
                continue;
            }
            let vertex_count = positions.len();

            let indices: Vec<u32> = reader
                .read_indices()
                .map(|iter| iter.into_u32().collect())
                .unwrap_or_else(|| (0..vertex_count as u32).collect());

            let uvs: Vec<Point2> = reader
                .read_tex_coords(0)
                .map(|iter| iter.into_f32().map(|uv| Point2::new(uv[0] as f64, uv[1] as f64)).collect())
                .unwrap_or_default();

            let mut out = TriangleMesh {
                positions,
                normals: Vec::new(),
                indices,
                uvs,
            };
            match reader.read_normals() {
                Some(iter) => {
                    out.normals = iter
                        .map(|n| Vector3::new(n[0] as f64, n[1] as f64, n[2] as f64))
                        .collect()
                }
                None => out.compute_normals(),
            }
            return Ok(out);
        }
    }

    Err(SwimError::asset_load("glTF contains no mesh primitive with positions"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swim_math::DVec3;

    #[test]
    fn test_in_memory_source() {
        let mesh = TriangleMesh::ellipsoid(DVec3::new(1.0, 1.0, 3.0), 4, 6);
        let loaded = pollster::block_on(InMemorySource::new(mesh.clone()).load_mesh()).unwrap();
        assert_eq!(loaded.vertex_count(), mesh.vertex_count());
    }

    #[test]
    fn test_empty_in_memory_source_fails() {
        let err = pollster::block_on(InMemorySource::new(TriangleMesh::default()).load_mesh()).unwrap_err();
        assert!(matches!(err, SwimError::AssetLoad(_)));
    }

    #[test]
    fn test_missing_file_fails() {
        let source = GlbFileSource::new("/nonexistent/dolphin.glb");
        let err = pollster::block_on(source.load_mesh()).unwrap_err();
        assert!(matches!(err, SwimError::AssetLoad(_)));
    }

    /// Binary glTF holding one indexed triangle with positions only.
    fn triangle_glb() -> Vec<u8> {
        let mut bin = Vec::new();
        for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in v {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        let bin_len = bin.len();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let mut json = format!(
            r#"{{"asset":{{"version":"2.0"}},"buffers":[{{"byteLength":{bin_len}}}],"bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":36}},{{"buffer":0,"byteOffset":36,"byteLength":6}}],"accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0,0,0],"max":[1,1,0]}},{{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}}],"meshes":[{{"primitives":[{{"attributes":{{"POSITION":0}},"indices":1}}]}}]}}"#
        )
        .into_bytes();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    #[test]
    fn test_parse_single_triangle() {
        let mesh = parse_glb(&triangle_glb()).unwrap();
        assert_eq!(mesh.positions, vec![DVec3::ZERO, DVec3::X, DVec3::Y]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert!(mesh.uvs.is_empty());
        // no NORMAL attribute: normals are computed from the face
        assert_eq!(mesh.normals, vec![DVec3::Z; 3]);
    }

    #[test]
    fn test_glb_file_source_reads_triangle() {
        let path = std::env::temp_dir().join(format!("swim-triangle-{}.glb", std::process::id()));
        std::fs::write(&path, triangle_glb()).unwrap();
        let mesh = pollster::block_on(GlbFileSource::new(&path).load_mesh());
        std::fs::remove_file(&path).unwrap();
        assert_eq!(mesh.unwrap().triangle_count(), 1);
    }

    #[test]
    fn test_garbage_bytes_fail() {
        let err = parse_glb(b"definitely not a glb").unwrap_err();
        assert!(matches!(err, SwimError::AssetLoad(_)));
    }
}
