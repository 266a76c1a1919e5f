//! The encoded sample buffer as a float texture.
//!
//! WebGPU has no three-channel float format, so texels are padded to RGBA.
//! Lookups must use integer texel loads (or a nearest sampler): blending would
//! mix neighbouring rows, which hold unrelated vectors.

use serde::{Deserialize, Serialize};
use swim_core::{Result, SwimError};
use swim_deform::{EncodedBuffer, SampleRow, CHANNELS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplineTexture {
    pub width: u32,
    pub height: u32,
    pub filter: TextureFilter,
    /// RGBA32F texels, row-major
    pub texels: Vec<f32>,
}

impl SplineTexture {
    pub const TEXEL_CHANNELS: usize = 4;

    pub fn from_buffer(buffer: &EncodedBuffer) -> Self {
        let texels = buffer
            .data()
            .chunks_exact(CHANNELS)
            .flat_map(|c| [c[0] as f32, c[1] as f32, c[2] as f32, 0.0])
            .collect();
        Self {
            width: buffer.width() as u32,
            height: SampleRow::COUNT as u32,
            filter: TextureFilter::Nearest,
            texels,
        }
    }

    pub fn texel(&self, row: SampleRow, column: u32) -> [f32; 3] {
        let o = (row.index() * self.width as usize + column as usize) * Self::TEXEL_CHANNELS;
        [self.texels[o], self.texels[o + 1], self.texels[o + 2]]
    }

    /// Bytes per texture row, as needed for an upload.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * (Self::TEXEL_CHANNELS * std::mem::size_of::<f32>()) as u32
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    pub fn to_bincode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| SwimError::config(format!("texture encode failed: {}", e)))
    }

    pub fn from_bincode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| SwimError::config(format!("texture decode failed: {}", e)))
    }
}
