use swim_core::traits::BoundingBox;
use swim_math::{Aabb3, Point2, Point3, Transform, Vector3};

/// Rigid triangle mesh in its own local frame, long axis along +z.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    pub positions: Vec<Point3>,
    pub normals: Vec<Vector3>,
    pub indices: Vec<u32>,
    pub uvs: Vec<Point2>,
}

impl TriangleMesh {
    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Accumulate face normals onto shared vertices and normalize.
    pub fn compute_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.positions.len(), Vector3::ZERO);

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = self.positions[i0];
            let normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);
            self.normals[i0] += normal;
            self.normals[i1] += normal;
            self.normals[i2] += normal;
        }

        for n in &mut self.normals {
            *n = n.normalize_or_zero();
        }
    }

    /// Transform positions and normals in place.
    pub fn apply_transform(&mut self, transform: &Transform) {
        for p in &mut self.positions {
            *p = transform.transform_point(*p);
        }
        for n in &mut self.normals {
            *n = transform.transform_vector(*n).normalize_or_zero();
        }
    }

    /// Rotate about the local z axis, e.g. to turn an imported model's belly down.
    pub fn rotate_z(&mut self, angle: f64) {
        self.apply_transform(&Transform::from_rotation_z(angle));
    }

    /// Axis-aligned bounds of all positions; an empty mesh has a zero box.
    pub fn bounds(&self) -> Aabb3 {
        Aabb3::from_points(&self.positions).unwrap_or(Aabb3::new(Point3::ZERO, Point3::ZERO))
    }

    /// Closed ellipsoid centred on the origin with the given semi-axes.
    ///
    /// `rings` latitude bands run along z, `segments` around it.
    pub fn ellipsoid(radii: Vector3, rings: usize, segments: usize) -> Self {
        let rings = rings.max(2);
        let segments = segments.max(3);
        let mut mesh = TriangleMesh::default();

        for i in 0..=rings {
            let v = i as f64 / rings as f64;
            let phi = std::f64::consts::PI * v;
            for j in 0..=segments {
                let u = j as f64 / segments as f64;
                let theta = std::f64::consts::TAU * u;
                let dir = Vector3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), -phi.cos());
                mesh.positions.push(dir * radii);
                mesh.uvs.push(Point2::new(u, v));
            }
        }

        let row = (segments + 1) as u32;
        for i in 0..rings as u32 {
            for j in 0..segments as u32 {
                let a = i * row + j;
                let b = a + row;
                mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        mesh.compute_normals();
        mesh
    }
}

impl BoundingBox for TriangleMesh {
    type Point = Point3;

    fn bounding_box(&self) -> (Point3, Point3) {
        let b = self.bounds();
        (b.min, b.max)
    }
}
