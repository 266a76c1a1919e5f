//! Arc-length sampling of a curve with parallel-transported frames.
//!
//! Samples are spaced evenly by distance travelled, not by curve parameter, so
//! a linear playhead moves a swimmer at constant speed. Frames are carried
//! from one sample to the next by the minimal rotation that takes the previous
//! tangent onto the current one, which avoids the flips a pointwise Frenet
//! frame shows at inflections and on straight stretches.

use serde::{Deserialize, Serialize};
use swim_core::traits::Validate;
use swim_core::{Result, SwimError, Tolerance};
use swim_math::{DQuat, Frame, Point3, Vector3};
use tracing::debug;

use crate::arc_length::ArcLengthTable;
use crate::curve::Curve;

/// How the twist accumulated along the curve is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameClosure {
    /// Pure parallel transport from the seeded first frame.
    #[default]
    Open,
    /// Spread the angle between the first and last normal evenly over all
    /// samples so the last frame lines up with the first.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Number of intervals; `num_points + 1` samples are produced
    pub num_points: usize,
    /// Parameter steps used to measure arc length
    pub arc_length_divisions: usize,
    pub frame_closure: FrameClosure,
}

impl SamplerConfig {
    pub const DEFAULT_NUM_POINTS: usize = 511;
    pub const DEFAULT_ARC_LENGTH_DIVISIONS: usize = 2048;

    pub fn with_num_points(num_points: usize) -> Self {
        Self {
            num_points,
            ..Self::default()
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            num_points: Self::DEFAULT_NUM_POINTS,
            arc_length_divisions: Self::DEFAULT_ARC_LENGTH_DIVISIONS,
            frame_closure: FrameClosure::Open,
        }
    }
}

/// One station along the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Arc-length fraction in `[0, 1]`
    pub t: f64,
    pub point: Point3,
    pub tangent: Vector3,
    pub normal: Vector3,
    pub binormal: Vector3,
}

impl Sample {
    pub fn frame(&self) -> Frame {
        Frame {
            tangent: self.tangent,
            normal: self.normal,
            binormal: self.binormal,
        }
    }
}

/// `num_points + 1` samples evenly spaced by arc length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    samples: Vec<Sample>,
    arc_length: f64,
}

impl SampleSet {
    pub fn from_samples(samples: Vec<Sample>, arc_length: f64) -> Self {
        Self {
            samples,
            arc_length,
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of intervals between samples.
    pub fn num_points(&self) -> usize {
        self.samples.len().saturating_sub(1)
    }

    /// Total arc length of the sampled curve.
    pub fn arc_length(&self) -> f64 {
        self.arc_length
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }
}

impl std::ops::Index<usize> for SampleSet {
    type Output = Sample;

    fn index(&self, i: usize) -> &Sample {
        &self.samples[i]
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl Validate for SampleSet {
    fn validate(&self) -> Result<()> {
        const FRAME_EPS: f64 = 1e-6;
        if self.samples.len() < 2 {
            return Err(SwimError::degenerate_curve(format!(
                "sample set has {} sample(s), need at least 2",
                self.samples.len()
            )));
        }
        for (i, s) in self.samples.iter().enumerate() {
            let frame = s.frame();
            if frame.orthonormal_error() > FRAME_EPS || !frame.is_right_handed() {
                return Err(SwimError::degenerate_curve(format!(
                    "frame {} is not orthonormal and right-handed",
                    i
                )));
            }
        }
        Ok(())
    }
}

/// Sample `curve` at `num_points + 1` arc-length stations with default settings.
pub fn sample_curve(curve: &dyn Curve, num_points: usize) -> Result<SampleSet> {
    sample_curve_with(curve, &SamplerConfig::with_num_points(num_points))
}

pub fn sample_curve_with(curve: &dyn Curve, config: &SamplerConfig) -> Result<SampleSet> {
    let tol = Tolerance::default();
    let n = config.num_points;
    if n == 0 {
        return Err(SwimError::degenerate_curve("num_points must be at least 1"));
    }

    let table = ArcLengthTable::new(curve, config.arc_length_divisions);
    let arc_length = table.total_length();
    if tol.is_zero_length(arc_length) {
        return Err(SwimError::degenerate_curve(format!(
            "curve has zero arc length ({:e})",
            arc_length
        )));
    }

    let params: Vec<f64> = (0..=n)
        .map(|i| table.parameter_at(i as f64 / n as f64))
        .collect();
    let points: Vec<Point3> = params.iter().map(|&t| curve.point_at(t)).collect();
    let tangents = unit_tangents(curve, &params, &points, tol);
    let mut frames = transport_frames(&tangents, tol);
    if config.frame_closure == FrameClosure::Closed {
        close_frames(&mut frames);
    }

    let samples = points
        .into_iter()
        .zip(frames)
        .enumerate()
        .map(|(i, (point, frame))| Sample {
            t: i as f64 / n as f64,
            point,
            tangent: frame.tangent,
            normal: frame.normal,
            binormal: frame.binormal,
        })
        .collect();

    debug!(num_points = n, arc_length, "sampled curve");
    Ok(SampleSet::from_samples(samples, arc_length))
}

/// Normalized derivatives, falling back to neighbouring chords where the
/// derivative vanishes (coincident control points).
fn unit_tangents(curve: &dyn Curve, params: &[f64], points: &[Point3], tol: Tolerance) -> Vec<Vector3> {
    let last = points.len() - 1;
    let mut tangents: Vec<Vector3> = Vec::with_capacity(points.len());
    for (i, &t) in params.iter().enumerate() {
        let d = curve.tangent_at(t);
        let dir = if !tol.is_zero_length(d.length()) {
            d.normalize()
        } else {
            let chord = if i < last {
                points[i + 1] - points[i]
            } else {
                points[i] - points[i - 1]
            };
            chord
                .try_normalize()
                .or_else(|| tangents.last().copied())
                .unwrap_or(Vector3::X)
        };
        tangents.push(dir);
    }
    tangents
}

fn transport_frames(tangents: &[Vector3], tol: Tolerance) -> Vec<Frame> {
    let mut frames = Vec::with_capacity(tangents.len());
    let mut frame = Frame::seed(tangents[0]);
    frames.push(frame);

    for pair in tangents.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        let axis = prev.cross(next);
        let mut normal = frame.normal;
        if !tol.is_parallel(axis.length_squared()) {
            let theta = prev.dot(next).clamp(-1.0, 1.0).acos();
            normal = DQuat::from_axis_angle(axis.normalize(), theta) * normal;
        }
        frame = Frame::from_tangent_normal(next, normal);
        frames.push(frame);
    }
    frames
}

fn close_frames(frames: &mut [Frame]) {
    let n = frames.len() - 1;
    let (first, last) = (frames[0], frames[n]);
    let mut theta = first.normal.dot(last.normal).clamp(-1.0, 1.0).acos() / n as f64;
    if first.tangent.dot(first.normal.cross(last.normal)) > 0.0 {
        theta = -theta;
    }
    for (i, frame) in frames.iter_mut().enumerate().skip(1) {
        let twist = DQuat::from_axis_angle(frame.tangent, theta * i as f64);
        *frame = Frame::from_tangent_normal(frame.tangent, twist * frame.normal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::curve::CatmullRomCurve;
    use swim_math::DVec3;

    fn helix(turns: f64, count: usize) -> CatmullRomCurve {
        let pts = (0..count)
            .map(|i| {
                let a = turns * std::f64::consts::TAU * i as f64 / (count - 1) as f64;
                DVec3::new(a.cos() * 5.0, a.sin() * 5.0, a * 0.8)
            })
            .collect();
        CatmullRomCurve::centripetal(pts, false).unwrap()
    }

    #[test]
    fn test_sample_count_and_t() {
        let set = sample_curve(&helix(1.0, 20), 64).unwrap();
        assert_eq!(set.len(), 65);
        assert_eq!(set.num_points(), 64);
        assert_eq!(set[0].t, 0.0);
        assert_eq!(set[64].t, 1.0);
        assert_abs_diff_eq!(set[16].t, 0.25, epsilon = 1e-15);
        set.validate().unwrap();
    }

    #[test]
    fn test_zero_points_rejected() {
        let err = sample_curve(&helix(1.0, 8), 0).unwrap_err();
        assert!(matches!(err, SwimError::DegenerateCurve(_)));
    }

    #[test]
    fn test_zero_length_rejected() {
        let curve = CatmullRomCurve::centripetal(vec![DVec3::ONE, DVec3::ONE, DVec3::ONE], false).unwrap();
        let err = sample_curve(&curve, 16).unwrap_err();
        assert!(matches!(err, SwimError::DegenerateCurve(_)));
    }

    #[test]
    fn test_straight_line_frames_constant() {
        let curve = CatmullRomCurve::centripetal(
            vec![DVec3::ZERO, DVec3::new(0.0, 0.0, 2.0), DVec3::new(0.0, 0.0, 8.0)],
            false,
        )
        .unwrap();
        let set = sample_curve(&curve, 32).unwrap();
        let n0 = set[0].normal;
        for s in &set {
            assert_abs_diff_eq!(s.tangent, DVec3::Z, epsilon = 1e-9);
            assert_abs_diff_eq!(s.normal, n0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_closed_frames_meet() {
        let pts = vec![
            DVec3::new(4.0, 0.0, 0.0),
            DVec3::new(0.0, 4.0, 2.0),
            DVec3::new(-4.0, 0.0, 0.0),
            DVec3::new(0.0, -4.0, -2.0),
        ];
        let curve = CatmullRomCurve::centripetal(pts, true).unwrap();
        let config = SamplerConfig {
            num_points: 256,
            frame_closure: FrameClosure::Closed,
            ..SamplerConfig::default()
        };
        let set = sample_curve_with(&curve, &config).unwrap();
        set.validate().unwrap();
        let (first, last) = (set.first().unwrap(), set.last().unwrap());
        assert_abs_diff_eq!(first.point, last.point, epsilon = 1e-9);
        assert!((first.normal - last.normal).length() < 1e-4, "{:?} vs {:?}", first.normal, last.normal);
    }
}
