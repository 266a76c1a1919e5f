//! Per-vertex curve deformation.
//!
//! A vertex's local z picks where along the curve its cross-section sits; its
//! local x and y are re-expressed in the curve frame at that spot:
//!
//! ```text
//! d = z / size.z
//! t = playhead + d * length_ratio
//! P, N, B = lerp(buffer[floor(t * n)], buffer[floor(t * n) + 1])
//! out = P + N * x + B * y
//! ```

use rayon::prelude::*;
use swim_math::{DVec3, Point3, Vector3};

use crate::context::DeformationContext;
use crate::encode::{EncodedBuffer, SampleRow};
use crate::mesh::TriangleMesh;

/// Interpolated curve frame; normal and binormal are not renormalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFrame {
    pub point: Point3,
    pub normal: Vector3,
    pub binormal: Vector3,
}

/// Arc-length parameter at which a local vertex sits, before the boundary policy.
#[inline]
pub fn curve_parameter(local: DVec3, ctx: &DeformationContext, playhead: f64) -> f64 {
    let d = local.z / ctx.obj_size.z;
    playhead + d * ctx.length_ratio
}

/// Blend the two samples bracketing `t` (already resolved into `[0, 1]`).
#[inline]
pub fn frame_at(buffer: &EncodedBuffer, t: f64) -> CurveFrame {
    let n = buffer.num_points();
    if n == 0 {
        return CurveFrame {
            point: buffer.texel(SampleRow::Point, 0),
            normal: buffer.texel(SampleRow::Normal, 0),
            binormal: buffer.texel(SampleRow::Binormal, 0),
        };
    }

    let index = t * n as f64;
    let prev = (index.floor().max(0.0) as usize).min(n - 1);
    let next = prev + 1;
    let f = index - prev as f64;

    let lerp = |row: SampleRow| buffer.texel(row, prev).lerp(buffer.texel(row, next), f);
    CurveFrame {
        point: lerp(SampleRow::Point),
        normal: lerp(SampleRow::Normal),
        binormal: lerp(SampleRow::Binormal),
    }
}

/// World-space position of one local vertex at the given playhead.
#[inline]
pub fn deformed_position(
    local: DVec3,
    ctx: &DeformationContext,
    buffer: &EncodedBuffer,
    playhead: f64,
) -> DVec3 {
    let t = ctx.policy.apply(curve_parameter(local, ctx, playhead));
    let frame = frame_at(buffer, t);
    frame.point + frame.normal * local.x + frame.binormal * local.y
}

/// Deform every vertex of `mesh` in parallel.
pub fn deform_mesh(
    mesh: &TriangleMesh,
    ctx: &DeformationContext,
    buffer: &EncodedBuffer,
    playhead: f64,
) -> Vec<DVec3> {
    mesh.positions
        .par_iter()
        .map(|&p| deformed_position(p, ctx, buffer, playhead))
        .collect()
}

/// Like [`deform_mesh`], writing into a reused output slice.
///
/// Extra entries on either side are left untouched.
pub fn deform_into(
    positions: &[DVec3],
    out: &mut [DVec3],
    ctx: &DeformationContext,
    buffer: &EncodedBuffer,
    playhead: f64,
) {
    out.par_iter_mut()
        .zip(positions.par_iter())
        .for_each(|(dst, &p)| *dst = deformed_position(p, ctx, buffer, playhead));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::context::BoundaryPolicy;
    use crate::encode::encode;
    use swim_geometry::{Sample, SampleSet};

    /// Straight path along +x: point i at (i, 0, 0), normal +y, binormal +z.
    fn straight_buffer(n: usize) -> EncodedBuffer {
        let samples = (0..=n)
            .map(|i| Sample {
                t: i as f64 / n as f64,
                point: DVec3::new(i as f64, 0.0, 0.0),
                tangent: DVec3::X,
                normal: DVec3::Y,
                binormal: DVec3::Z,
            })
            .collect();
        encode(&SampleSet::from_samples(samples, n as f64)).unwrap()
    }

    fn ctx(policy: BoundaryPolicy) -> DeformationContext {
        DeformationContext::with_length_ratio(DVec3::new(2.0, 2.0, 4.0), 0.5, policy).unwrap()
    }

    #[test]
    fn test_interpolates_between_samples() {
        let buffer = straight_buffer(10);
        let p = deformed_position(DVec3::ZERO, &ctx(BoundaryPolicy::Clamp), &buffer, 0.37);
        assert_abs_diff_eq!(p, DVec3::new(3.7, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_cross_section_maps_into_frame() {
        let buffer = straight_buffer(10);
        let p = deformed_position(DVec3::new(0.5, -0.25, 0.0), &ctx(BoundaryPolicy::Clamp), &buffer, 0.2);
        assert_abs_diff_eq!(p, DVec3::new(2.0, 0.5, -0.25), epsilon = 1e-12);
    }

    #[test]
    fn test_local_z_shifts_along_curve() {
        let buffer = straight_buffer(10);
        let c = ctx(BoundaryPolicy::Clamp);
        // z = 2 is the half-depth: d = 0.5, shift of 0.25 along the curve
        assert_abs_diff_eq!(curve_parameter(DVec3::new(0.0, 0.0, 2.0), &c, 0.5), 0.75, epsilon = 1e-15);
        let p = deformed_position(DVec3::new(0.0, 0.0, 2.0), &c, &buffer, 0.5);
        assert_abs_diff_eq!(p, DVec3::new(7.5, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_last_interval_reaches_end() {
        let buffer = straight_buffer(4);
        let frame = frame_at(&buffer, 1.0);
        assert_abs_diff_eq!(frame.point, DVec3::new(4.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_single_texel_buffer_is_total() {
        let sample = Sample {
            t: 0.0,
            point: DVec3::new(1.0, 2.0, 3.0),
            tangent: DVec3::X,
            normal: DVec3::Y,
            binormal: DVec3::Z,
        };
        let buffer = encode(&SampleSet::from_samples(vec![sample], 0.0)).unwrap();
        let p = deformed_position(DVec3::new(1.0, 0.0, 0.0), &ctx(BoundaryPolicy::Wrap), &buffer, 0.6);
        assert_eq!(p, DVec3::new(1.0, 3.0, 3.0));
    }

    #[test]
    fn test_deform_into_matches_deform_mesh() {
        let buffer = straight_buffer(16);
        let c = ctx(BoundaryPolicy::Wrap);
        let mesh = TriangleMesh::ellipsoid(DVec3::new(0.5, 0.5, 2.0), 4, 8);
        let expected = deform_mesh(&mesh, &c, &buffer, 0.3);
        let mut out = vec![DVec3::ZERO; mesh.vertex_count()];
        deform_into(&mesh.positions, &mut out, &c, &buffer, 0.3);
        assert_eq!(out, expected);
    }
}
