//! Packing a sample set into the two-axis lookup buffer read by the deformer.
//!
//! The buffer is a grid `width = num_points + 1` texels wide and
//! [`SampleRow::COUNT`] rows tall; each texel holds three channels. Rows are
//! stored one after another, so texel `(row, column)` starts at
//! `(row * width + column) * 3`. The same addressing is used by the CPU
//! deformer and the WGSL vertex stage.

use serde::{Deserialize, Serialize};
use swim_core::traits::Validate;
use swim_core::{Result, SwimError};
use swim_geometry::SampleSet;
use swim_math::DVec3;
use tracing::debug;

/// Channels per texel (x, y, z).
pub const CHANNELS: usize = 3;

/// Row assignment of the encoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleRow {
    Point = 0,
    Binormal = 1,
    Normal = 2,
    /// Reserved; the deformer does not read it.
    Tangent = 3,
}

impl SampleRow {
    pub const COUNT: usize = 4;
    pub const ALL: [SampleRow; Self::COUNT] = [
        SampleRow::Point,
        SampleRow::Binormal,
        SampleRow::Normal,
        SampleRow::Tangent,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedBuffer {
    width: usize,
    data: Vec<f64>,
}

impl EncodedBuffer {
    /// Texels along the parameter axis (`num_points + 1`).
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        SampleRow::COUNT
    }

    /// Intervals along the parameter axis.
    pub fn num_points(&self) -> usize {
        self.width - 1
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Offset of the first channel of texel `(row, column)`.
    #[inline]
    pub fn offset(&self, row: SampleRow, column: usize) -> usize {
        (row.index() * self.width + column) * CHANNELS
    }

    #[inline]
    pub fn texel(&self, row: SampleRow, column: usize) -> DVec3 {
        let o = self.offset(row, column);
        DVec3::new(self.data[o], self.data[o + 1], self.data[o + 2])
    }
}

impl Validate for EncodedBuffer {
    fn validate(&self) -> Result<()> {
        if self.width < 2 {
            return Err(SwimError::degenerate_curve(format!(
                "encoded buffer needs at least 2 columns, has {}",
                self.width
            )));
        }
        let expected = self.width * SampleRow::COUNT * CHANNELS;
        if self.data.len() != expected {
            return Err(SwimError::degenerate_curve(format!(
                "encoded buffer holds {} values, layout expects {}",
                self.data.len(),
                expected
            )));
        }
        Ok(())
    }
}

/// Write points, binormals, normals and tangents row by row.
pub fn encode(set: &SampleSet) -> Result<EncodedBuffer> {
    if set.is_empty() {
        return Err(SwimError::EmptySampleSet);
    }
    let width = set.len();
    let mut data = Vec::with_capacity(width * SampleRow::COUNT * CHANNELS);
    for row in SampleRow::ALL {
        for s in set {
            let v = match row {
                SampleRow::Point => s.point,
                SampleRow::Binormal => s.binormal,
                SampleRow::Normal => s.normal,
                SampleRow::Tangent => s.tangent,
            };
            data.extend_from_slice(&v.to_array());
        }
    }
    debug!(width, values = data.len(), "encoded sample buffer");
    Ok(EncodedBuffer { width, data })
}
