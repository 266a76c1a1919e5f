//! Per-instance constants derived once from the mesh bounds and the curve length.

use serde::{Deserialize, Serialize};
use swim_core::{Result, SwimError, Tolerance};
use swim_geometry::SampleSet;
use swim_math::Vector3;

use crate::mesh::TriangleMesh;

/// How curve parameters outside `[0, 1]` are brought back onto the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Take `t` modulo 1: the path is treated as a loop. `t = 1` lands on
    /// the first sample, so a body straddling the end is split across the path.
    Wrap,
    /// Pin `t` to `[0, 1]`: vertices past either end stay on the end sample.
    /// A swimmer holding at playhead 1 bunches up at the end of its path.
    #[default]
    Clamp,
}

impl BoundaryPolicy {
    /// Resolve `t` into `[0, 1]`. Non-finite values resolve to the curve start.
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        if !t.is_finite() {
            return 0.0;
        }
        match self {
            BoundaryPolicy::Wrap => t.rem_euclid(1.0),
            BoundaryPolicy::Clamp => t.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeformationContext {
    /// Object-local bounding-box size
    pub obj_size: Vector3,
    /// Mesh depth as a fraction of the curve's arc length
    pub length_ratio: f64,
    pub policy: BoundaryPolicy,
}

impl DeformationContext {
    /// Derive the context from a mesh size and the arc length of its path.
    pub fn new(obj_size: Vector3, arc_length: f64, policy: BoundaryPolicy) -> Result<Self> {
        let tol = Tolerance::default();
        if !arc_length.is_finite() || tol.is_zero_length(arc_length) {
            return Err(SwimError::degenerate_curve(format!(
                "cannot fit a mesh onto a curve of arc length {}",
                arc_length
            )));
        }
        Self::with_length_ratio(obj_size, obj_size.z / arc_length, policy)
    }

    /// Build with an explicit length ratio.
    pub fn with_length_ratio(obj_size: Vector3, length_ratio: f64, policy: BoundaryPolicy) -> Result<Self> {
        let tol = Tolerance::default();
        if !obj_size.z.is_finite() || tol.is_zero_length(obj_size.z) {
            return Err(SwimError::degenerate_mesh(format!(
                "mesh has no depth along its long axis (size.z = {})",
                obj_size.z
            )));
        }
        if !length_ratio.is_finite() {
            return Err(SwimError::degenerate_mesh(format!(
                "length ratio {} is not finite",
                length_ratio
            )));
        }
        Ok(Self {
            obj_size,
            length_ratio,
            policy,
        })
    }

    pub fn from_mesh(mesh: &TriangleMesh, samples: &SampleSet, policy: BoundaryPolicy) -> Result<Self> {
        Self::new(mesh.bounds().size(), samples.arc_length(), policy)
    }
}
