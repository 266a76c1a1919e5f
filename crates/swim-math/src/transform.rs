use crate::{DMat4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Affine transform applied to mesh geometry before deformation setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub matrix: [f64; 16],
}

impl Transform {
    pub fn identity() -> Self {
        Self::from_mat4(DMat4::IDENTITY)
    }

    pub fn from_translation(t: Vector3) -> Self {
        Self::from_mat4(DMat4::from_translation(t))
    }

    pub fn from_rotation_x(angle: f64) -> Self {
        Self::from_mat4(DMat4::from_rotation_x(angle))
    }

    pub fn from_rotation_y(angle: f64) -> Self {
        Self::from_mat4(DMat4::from_rotation_y(angle))
    }

    pub fn from_rotation_z(angle: f64) -> Self {
        Self::from_mat4(DMat4::from_rotation_z(angle))
    }

    pub fn from_scale(s: Vector3) -> Self {
        Self::from_mat4(DMat4::from_scale(s))
    }

    pub fn from_mat4(m: DMat4) -> Self {
        Self {
            matrix: m.to_cols_array(),
        }
    }

    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_cols_array(&self.matrix)
    }

    pub fn transform_point(&self, p: Point3) -> Point3 {
        self.to_mat4().transform_point3(p)
    }

    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        self.to_mat4().transform_vector3(v)
    }

    /// Apply `self` first, then `other`.
    pub fn then(&self, other: &Transform) -> Transform {
        Self::from_mat4(other.to_mat4() * self.to_mat4())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec3;

    #[test]
    fn test_rotation_z_quarter_turn() {
        let t = Transform::from_rotation_z(-std::f64::consts::FRAC_PI_2);
        let p = t.transform_point(dvec3(1.0, 0.0, 2.0));
        assert!((p - dvec3(0.0, -1.0, 2.0)).length() < 1e-12);
    }

    #[test]
    fn test_then_order() {
        let t = Transform::from_scale(dvec3(2.0, 2.0, 2.0))
            .then(&Transform::from_translation(dvec3(1.0, 0.0, 0.0)));
        let p = t.transform_point(dvec3(1.0, 1.0, 1.0));
        assert!((p - dvec3(3.0, 2.0, 2.0)).length() < 1e-12);
    }

    #[test]
    fn test_vector_ignores_translation() {
        let t = Transform::from_translation(dvec3(10.0, 20.0, 30.0));
        let v = t.transform_vector(dvec3(0.0, 1.0, 0.0));
        assert!((v - dvec3(0.0, 1.0, 0.0)).length() < 1e-12);
    }
}
