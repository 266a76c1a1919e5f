//! Arc-length reparametrization of a curve.

use crate::curve::Curve;

/// Cumulative chord lengths over a uniform parameter grid.
///
/// Maps an arc-length fraction `u ∈ [0, 1]` back to a curve parameter by
/// binary search and linear interpolation between grid entries.
#[derive(Debug, Clone)]
pub struct ArcLengthTable {
    t_min: f64,
    t_max: f64,
    lengths: Vec<f64>,
}

impl ArcLengthTable {
    pub fn new(curve: &dyn Curve, divisions: usize) -> Self {
        let divisions = divisions.max(1);
        let (t_min, t_max) = curve.domain();
        let mut lengths = Vec::with_capacity(divisions + 1);
        lengths.push(0.0);

        let mut last = curve.point_at(t_min);
        let mut total = 0.0;
        for i in 1..=divisions {
            let t = t_min + (t_max - t_min) * i as f64 / divisions as f64;
            let p = curve.point_at(t);
            total += p.distance(last);
            lengths.push(total);
            last = p;
        }

        Self {
            t_min,
            t_max,
            lengths,
        }
    }

    pub fn total_length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Curve parameter at which the traversed length equals `u * total_length()`.
    pub fn parameter_at(&self, u: f64) -> f64 {
        let total = self.total_length();
        let last = self.lengths.len() - 1;
        if total <= 0.0 {
            return self.t_min;
        }
        let target = u.clamp(0.0, 1.0) * total;

        // First entry with length >= target, stepped back to bracket it
        let hi = self.lengths.partition_point(|&l| l < target).min(last);
        let i = hi.saturating_sub(1);
        let before = self.lengths[i];
        let span = self.lengths[i + 1] - before;
        let frac = if span > 0.0 {
            ((target - before) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let grid = (i as f64 + frac) / last as f64;
        self.t_min + (self.t_max - self.t_min) * grid
    }
}
