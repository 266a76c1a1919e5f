//! Placing a 2D profile in 3D and fitting the swim curve through it.

use swim_core::{Result, SwimError};
use swim_math::{remap, Point2, Point3};
use tracing::debug;

use crate::curve::CatmullRomCurve;
use crate::profile::{PlacementBox, Profile2D, ProfileBox, DEFAULT_DIVISIONS};

/// Map profile points into the placement box.
///
/// x follows the profile box left to right; y is flipped so the profile's
/// minimum lands on `y_max`. A zero-width source axis maps to the middle of
/// the target range.
pub fn remap_profile(points: &[Point2], frame: &ProfileBox, placement: &PlacementBox) -> Vec<Point3> {
    let axis = |v: f64, lo: f64, hi: f64, dst_lo: f64, dst_hi: f64| {
        if (hi - lo).abs() > f64::EPSILON {
            remap(v, lo, hi, dst_lo, dst_hi)
        } else {
            (dst_lo + dst_hi) * 0.5
        }
    };
    points
        .iter()
        .map(|p| {
            Point3::new(
                axis(p.x, frame.min.x, frame.max.x, placement.x_min, placement.x_max),
                axis(p.y, frame.min.y, frame.max.y, placement.y_max, placement.y_min),
                placement.z,
            )
        })
        .collect()
}

/// Build an open centripetal spline through `profile` placed in `placement`.
pub fn build_curve(profile: &Profile2D, placement: &PlacementBox) -> Result<CatmullRomCurve> {
    let flat = profile.points(DEFAULT_DIVISIONS);
    if flat.len() < 2 {
        return Err(SwimError::degenerate_curve(format!(
            "profile flattens to {} point(s), need at least 2",
            flat.len()
        )));
    }
    let points = remap_profile(&flat, &profile.profile_box(), placement);
    debug!(points = points.len(), z = placement.z, "built swim curve");
    CatmullRomCurve::centripetal(points, false)
}
