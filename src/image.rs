//! Raster image input
//!
//! The approximation consumes a raw interleaved byte buffer. Row 0 is the
//! bottom row of the picture (smallest y in domain coordinates).

use crate::error::{ApproxError, Result};

/// An owned raster image with 1, 3 or 4 interleaved byte channels
#[derive(Debug, Clone)]
pub struct Image {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
}

impl Image {
    /// Wrap a raw interleaved buffer
    ///
    /// `data` must hold exactly `width * height * channels` bytes, rows
    /// bottom-up.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` for zero dimensions, an unsupported channel
    /// count or a buffer of the wrong length.
    pub fn from_raw(data: Vec<u8>, width: usize, height: usize, channels: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ApproxError::InvalidImage(format!(
                "dimensions must be positive (got {}x{})",
                width, height
            )));
        }
        if !matches!(channels, 1 | 3 | 4) {
            return Err(ApproxError::InvalidImage(format!(
                "channel count must be 1, 3 or 4 (got {})",
                channels
            )));
        }
        if data.len() != width * height * channels {
            return Err(ApproxError::InvalidImage(format!(
                "buffer holds {} bytes, expected {}",
                data.len(),
                width * height * channels
            )));
        }

        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Raw interleaved bytes, rows bottom-up
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Height / width aspect ratio; the image spans `[-1,1] x [-ratio,ratio]`
    /// in domain coordinates
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.height as f64 / self.width as f64
    }

    /// Channel bytes of the pixel in column `i`, row `j`
    #[inline]
    pub fn pixel(&self, i: i32, j: i32) -> &[u8] {
        let id = (j as usize * self.width + i as usize) * self.channels;
        &self.data[id..id + self.channels]
    }
}
