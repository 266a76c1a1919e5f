//! Orthonormal moving frames attached to curve samples.

use crate::Vector3;
use serde::{Deserialize, Serialize};

/// A right-handed orthonormal basis: `tangent × normal = binormal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tangent: Vector3,
    pub normal: Vector3,
    pub binormal: Vector3,
}

impl Frame {
    /// Build the starting frame for a unit tangent.
    ///
    /// The normal is seeded from the world axis along which the tangent has its
    /// smallest component, which is never parallel to the tangent.
    pub fn seed(tangent: Vector3) -> Self {
        let abs = tangent.abs();
        let axis = if abs.x <= abs.y && abs.x <= abs.z {
            Vector3::X
        } else if abs.y <= abs.z {
            Vector3::Y
        } else {
            Vector3::Z
        };
        let side = tangent.cross(axis).normalize();
        let normal = tangent.cross(side);
        Self::from_tangent_normal(tangent, normal)
    }

    /// Complete a frame from a unit tangent and an (approximately) orthogonal normal.
    ///
    /// The normal is re-orthogonalized against the tangent before the binormal
    /// is derived.
    pub fn from_tangent_normal(tangent: Vector3, normal: Vector3) -> Self {
        let normal = (normal - tangent * tangent.dot(normal)).normalize();
        Self {
            tangent,
            normal,
            binormal: tangent.cross(normal),
        }
    }

    /// Largest deviation from orthonormality across the three axes.
    pub fn orthonormal_error(&self) -> f64 {
        let lengths = [
            (self.tangent.length() - 1.0).abs(),
            (self.normal.length() - 1.0).abs(),
            (self.binormal.length() - 1.0).abs(),
        ];
        let dots = [
            self.tangent.dot(self.normal).abs(),
            self.tangent.dot(self.binormal).abs(),
            self.normal.dot(self.binormal).abs(),
        ];
        lengths.into_iter().chain(dots).fold(0.0, f64::max)
    }

    pub fn is_right_handed(&self) -> bool {
        self.tangent.cross(self.normal).dot(self.binormal) > 0.0
    }
}
