/// Numeric thresholds shared by curve sampling and deformation setup.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Below this, a length (arc length, bounding-box depth) counts as zero
    pub length: f64,
    /// Below this, a cross product counts as parallel vectors
    pub parallel: f64,
}

impl Tolerance {
    pub const DEFAULT_LENGTH: f64 = 1e-9;
    pub const DEFAULT_PARALLEL: f64 = 1e-12;

    pub fn new(length: f64, parallel: f64) -> Self {
        Self { length, parallel }
    }

    pub fn default_precision() -> Self {
        Self {
            length: Self::DEFAULT_LENGTH,
            parallel: Self::DEFAULT_PARALLEL,
        }
    }

    /// Check if a length is zero within tolerance
    pub fn is_zero_length(self, v: f64) -> bool {
        v.abs() < self.length
    }

    /// Check if two lengths are equal within tolerance
    pub fn length_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.length
    }

    /// Check if a squared cross-product magnitude means "parallel"
    pub fn is_parallel(self, cross_len_sq: f64) -> bool {
        cross_len_sq < self.parallel
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
