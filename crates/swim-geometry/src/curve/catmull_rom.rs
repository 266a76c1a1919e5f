//! Non-uniform Catmull-Rom spline through a sequence of control points.

use serde::{Deserialize, Serialize};
use swim_core::{Result, SwimError};
use swim_math::{Point3, Vector3};

use super::Curve;

/// Knot-spacing exponent for centripetal parametrization.
pub const CENTRIPETAL_ALPHA: f64 = 0.5;

/// Knot intervals shorter than this are treated as coincident points.
const MIN_KNOT_INTERVAL: f64 = 1e-4;

/// An interpolating cubic spline that passes through every control point.
///
/// Knot intervals are `|P[i+1] - P[i]|^alpha`: `0.0` is the uniform spline,
/// `0.5` centripetal and `1.0` chordal. The global parameter runs over `[0, 1]`
/// with each segment taking an equal share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatmullRomCurve {
    pub points: Vec<Point3>,
    pub closed: bool,
    pub alpha: f64,
}

/// Cubic polynomial `c0 + c1 w + c2 w^2 + c3 w^3` for one segment.
struct SegmentPoly {
    c0: Vector3,
    c1: Vector3,
    c2: Vector3,
    c3: Vector3,
}

impl SegmentPoly {
    fn value(&self, w: f64) -> Point3 {
        self.c0 + w * (self.c1 + w * (self.c2 + w * self.c3))
    }

    fn derivative(&self, w: f64) -> Vector3 {
        self.c1 + w * (2.0 * self.c2 + 3.0 * w * self.c3)
    }
}

impl CatmullRomCurve {
    pub fn new(points: Vec<Point3>, closed: bool, alpha: f64) -> Result<Self> {
        if points.len() < 2 {
            return Err(SwimError::degenerate_curve(format!(
                "a spline needs at least 2 control points, got {}",
                points.len()
            )));
        }
        Ok(Self {
            points,
            closed,
            alpha,
        })
    }

    /// Centripetal spline (`alpha = 0.5`).
    pub fn centripetal(points: Vec<Point3>, closed: bool) -> Result<Self> {
        Self::new(points, closed, CENTRIPETAL_ALPHA)
    }

    pub fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    /// Map a global parameter to `(segment index, local weight in [0, 1])`.
    fn locate(&self, t: f64) -> (usize, f64) {
        let segments = self.segment_count();
        let t = if self.closed {
            t.rem_euclid(1.0)
        } else {
            t.clamp(0.0, 1.0)
        };
        let p = t * segments as f64;
        let seg = (p.floor() as usize).min(segments - 1);
        (seg, p - seg as f64)
    }

    /// The four points around segment `seg`, with phantom end points
    /// mirrored through the first/last point on open curves.
    fn neighborhood(&self, seg: usize) -> [Point3; 4] {
        let pts = &self.points;
        let l = pts.len();
        if self.closed {
            return [
                pts[(seg + l - 1) % l],
                pts[seg % l],
                pts[(seg + 1) % l],
                pts[(seg + 2) % l],
            ];
        }
        let p0 = if seg > 0 {
            pts[seg - 1]
        } else {
            2.0 * pts[0] - pts[1]
        };
        let p3 = if seg + 2 < l {
            pts[seg + 2]
        } else {
            2.0 * pts[l - 1] - pts[l - 2]
        };
        [p0, pts[seg], pts[seg + 1], p3]
    }

    fn segment(&self, seg: usize) -> SegmentPoly {
        let [p0, p1, p2, p3] = self.neighborhood(seg);
        let knot = |a: Point3, b: Point3| a.distance_squared(b).powf(self.alpha * 0.5);

        let mut dt1 = knot(p1, p2);
        let mut dt0 = knot(p0, p1);
        let mut dt2 = knot(p2, p3);
        if dt1 < MIN_KNOT_INTERVAL {
            dt1 = 1.0;
        }
        if dt0 < MIN_KNOT_INTERVAL {
            dt0 = dt1;
        }
        if dt2 < MIN_KNOT_INTERVAL {
            dt2 = dt1;
        }

        // Hermite tangents at p1 and p2, rescaled to the [0, 1] segment domain
        let m1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let m2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

        SegmentPoly {
            c0: p1,
            c1: m1,
            c2: -3.0 * p1 + 3.0 * p2 - 2.0 * m1 - m2,
            c3: 2.0 * p1 - 2.0 * p2 + m1 + m2,
        }
    }
}

impl Curve for CatmullRomCurve {
    fn point_at(&self, t: f64) -> Point3 {
        let (seg, w) = self.locate(t);
        self.segment(seg).value(w)
    }

    fn tangent_at(&self, t: f64) -> Vector3 {
        let (seg, w) = self.locate(t);
        self.segment(seg).derivative(w) * self.segment_count() as f64
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use swim_math::DVec3;

    fn zigzag() -> Vec<Point3> {
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 3.0, 0.0),
            DVec3::new(1.5, 3.1, 0.0),
            DVec3::new(6.0, -1.0, 2.0),
        ]
    }

    #[test]
    fn test_requires_two_points() {
        let err = CatmullRomCurve::centripetal(vec![DVec3::ZERO], false).unwrap_err();
        assert!(matches!(err, SwimError::DegenerateCurve(_)));
    }

    #[test]
    fn test_interpolates_control_points() {
        let pts = zigzag();
        let curve = CatmullRomCurve::centripetal(pts.clone(), false).unwrap();
        let segments = curve.segment_count() as f64;
        for (i, p) in pts.iter().enumerate() {
            let q = curve.point_at(i as f64 / segments);
            assert!((q - *p).length() < 1e-10, "control point {} missed: {:?}", i, q);
        }
    }

    #[test]
    fn test_two_points_is_straight() {
        let curve = CatmullRomCurve::centripetal(
            vec![DVec3::new(-1.0, 2.0, 0.0), DVec3::new(3.0, 2.0, 0.0)],
            false,
        )
        .unwrap();
        let mid = curve.point_at(0.5);
        assert_abs_diff_eq!(mid, DVec3::new(1.0, 2.0, 0.0), epsilon = 1e-10);
        let d = curve.tangent_at(0.25);
        assert!(d.x > 0.0 && d.y.abs() < 1e-10 && d.z.abs() < 1e-10);
    }

    #[test]
    fn test_tangent_matches_finite_difference() {
        let curve = CatmullRomCurve::centripetal(zigzag(), false).unwrap();
        let h = 1e-6;
        for &t in &[0.1, 0.4, 0.55, 0.9] {
            let fd = (curve.point_at(t + h) - curve.point_at(t - h)) / (2.0 * h);
            let an = curve.tangent_at(t);
            assert!(
                (fd - an).length() < 1e-4 * an.length().max(1.0),
                "t={}: analytic {:?} vs numeric {:?}",
                t,
                an,
                fd
            );
        }
    }

    #[test]
    fn test_closed_curve_wraps() {
        let square = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ];
        let curve = CatmullRomCurve::centripetal(square, true).unwrap();
        assert_eq!(curve.segment_count(), 4);
        assert!(curve.is_closed());
        assert_abs_diff_eq!(curve.point_at(0.0), curve.point_at(1.0), epsilon = 1e-10);
        let t0 = curve.tangent_at(0.0).normalize();
        let t1 = curve.tangent_at(1.0 - 1e-9).normalize();
        assert!(t0.dot(t1) > 0.999_999);
    }

    #[test]
    fn test_duplicate_points_stay_finite() {
        let pts = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 1.0, 0.0),
        ];
        let curve = CatmullRomCurve::centripetal(pts, false).unwrap();
        for i in 0..=10 {
            let p = curve.point_at(i as f64 / 10.0);
            assert!(p.is_finite());
        }
    }
}
