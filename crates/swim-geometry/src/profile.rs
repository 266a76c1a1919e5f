//! 2D reference profiles and the boxes used to place them in 3D.

use serde::{Deserialize, Serialize};
use swim_math::{Point2, Vector2};

/// Flattening resolution used for each Bézier segment when none is given.
pub const DEFAULT_DIVISIONS: usize = 12;

/// Axis-aligned range of the 2D coordinate system a profile is authored in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileBox {
    pub min: Point2,
    pub max: Point2,
}

impl ProfileBox {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn size(&self) -> Vector2 {
        self.max - self.min
    }
}

/// Target region a profile is stretched into: x and y ranges at a fixed depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z: f64,
}

impl PlacementBox {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64, z: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProfileSegment {
    Line { to: Point2 },
    Cubic { c1: Point2, c2: Point2, to: Point2 },
}

/// A 2D path made of line and cubic Bézier segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile2D {
    pub start: Point2,
    pub segments: Vec<ProfileSegment>,
    /// Authoring box; when absent the bounds of the flattened points are used
    pub frame: Option<ProfileBox>,
}

impl Profile2D {
    pub fn starting_at(start: Point2) -> Self {
        Self {
            start,
            segments: Vec::new(),
            frame: None,
        }
    }

    pub fn line_to(mut self, to: Point2) -> Self {
        self.segments.push(ProfileSegment::Line { to });
        self
    }

    pub fn bezier_curve_to(mut self, c1: Point2, c2: Point2, to: Point2) -> Self {
        self.segments.push(ProfileSegment::Cubic { c1, c2, to });
        self
    }

    pub fn with_frame(mut self, frame: ProfileBox) -> Self {
        self.frame = Some(frame);
        self
    }

    /// The arc a swimmer follows: a dip from the upper left down to the
    /// bottom and back up, authored in a 200 x 40 box.
    pub fn swim_arc() -> Self {
        Self::starting_at(Point2::new(0.0, 40.0))
            .bezier_curve_to(
                Point2::new(39.4459, 17.0938),
                Point2::new(62.5, 0.0),
                Point2::new(100.0, 0.0),
            )
            .bezier_curve_to(
                Point2::new(137.5, 0.0),
                Point2::new(173.133, 19.1339),
                Point2::new(200.0, 40.0),
            )
            .with_frame(ProfileBox::new(Point2::new(0.0, 0.0), Point2::new(200.0, 40.0)))
    }

    /// Flatten the path, splitting each Bézier into `divisions` chords.
    ///
    /// Consecutive duplicate points are dropped.
    pub fn points(&self, divisions: usize) -> Vec<Point2> {
        let divisions = divisions.max(1);
        let mut out = vec![self.start];
        let mut cursor = self.start;

        for segment in &self.segments {
            match *segment {
                ProfileSegment::Line { to } => {
                    push_distinct(&mut out, to);
                    cursor = to;
                }
                ProfileSegment::Cubic { c1, c2, to } => {
                    for j in 1..=divisions {
                        let s = j as f64 / divisions as f64;
                        push_distinct(&mut out, cubic_bezier(cursor, c1, c2, to, s));
                    }
                    cursor = to;
                }
            }
        }
        out
    }

    /// Explicit authoring box, or the bounds of the flattened path.
    pub fn profile_box(&self) -> ProfileBox {
        self.frame.unwrap_or_else(|| {
            let pts = self.points(DEFAULT_DIVISIONS);
            ProfileBox::from_points(&pts).unwrap_or(ProfileBox::new(self.start, self.start))
        })
    }
}

fn push_distinct(out: &mut Vec<Point2>, p: Point2) {
    if out.last() != Some(&p) {
        out.push(p);
    }
}

fn cubic_bezier(p0: Point2, p1: Point2, p2: Point2, p3: Point2, s: f64) -> Point2 {
    let k = 1.0 - s;
    p0 * (k * k * k) + p1 * (3.0 * k * k * s) + p2 * (3.0 * k * s * s) + p3 * (s * s * s)
}
