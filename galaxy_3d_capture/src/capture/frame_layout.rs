/// Byte layout of a packed frame.
///
/// For a `W x H` frame with `P = W * H` pixels:
///
/// | bytes                 | content                           |
/// |-----------------------|-----------------------------------|
/// | `[0, 3P)`             | RGB, one byte per channel         |
/// | `[3P, 7P)`            | depth, one native-endian f32/pixel |
/// | `[7P, 7P + 64)`       | model-view matrix, 16 f32         |
/// | `[7P + 64, 7P + 128)` | projection matrix, 16 f32         |
///
/// Only the RGB region exists when depth is not requested. Offsets are
/// byte offsets, so the depth and matrix regions need not be 4-byte aligned
/// and any `W x H` is valid. When `3P` is a multiple of 4 the model-view
/// matrix starts at float index `3P / 4 + P`.

use std::mem::size_of;
use std::ops::Range;
use glam::UVec2;
use crate::error::Result;
use crate::capture_bail;
use super::CaptureParameters;

const SOURCE: &str = "galaxy3d::capture::FrameLayout";

/// Bytes per pixel in the color region
pub const RGB_BYTES_PER_PIXEL: usize = 3;
/// Bytes per pixel in the depth region
pub const DEPTH_BYTES_PER_PIXEL: usize = size_of::<f32>();
/// Floats in one 4x4 matrix
pub const MATRIX_FLOATS: usize = 16;
/// Bytes in one 4x4 matrix
pub const MATRIX_BYTES: usize = MATRIX_FLOATS * size_of::<f32>();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    size: UVec2,
    want_depth: bool,
    pixels: usize,
    total: usize,
}

impl FrameLayout {
    /// Compute the layout of a `width` x `height` frame
    ///
    /// # Errors
    ///
    /// `ResourceAllocationError` for a zero dimension, or when the frame
    /// would not fit in addressable memory.
    pub fn new(width: u32, height: u32, want_depth: bool) -> Result<Self> {
        if width == 0 || height == 0 {
            capture_bail!(SOURCE, ResourceAllocationError,
                "cannot capture a {}x{} frame", width, height);
        }

        let (pixels, total) = match Self::compute_size(width as usize, height as usize, want_depth) {
            Some(sizes) => sizes,
            None => capture_bail!(SOURCE, ResourceAllocationError,
                "a {}x{} frame does not fit in memory", width, height),
        };

        Ok(Self {
            size: UVec2::new(width, height),
            want_depth,
            pixels,
            total,
        })
    }

    /// Layout for the given capture parameters
    pub fn for_parameters(parameters: &CaptureParameters) -> Result<Self> {
        Self::new(parameters.width, parameters.height, parameters.want_depth)
    }

    fn compute_size(width: usize, height: usize, want_depth: bool) -> Option<(usize, usize)> {
        let pixels = width.checked_mul(height)?;
        let mut size = pixels.checked_mul(RGB_BYTES_PER_PIXEL)?;
        if want_depth {
            size = size.checked_add(pixels.checked_mul(DEPTH_BYTES_PER_PIXEL)?)?;
            size = size.checked_add(2 * MATRIX_BYTES)?;
        }
        Some((pixels, size))
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn want_depth(&self) -> bool {
        self.want_depth
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels
    }

    /// Exact number of bytes a packed frame occupies
    pub fn required_buffer_size(&self) -> usize {
        self.total
    }

    pub fn rgb_range(&self) -> Range<usize> {
        0..self.pixels * RGB_BYTES_PER_PIXEL
    }

    pub fn depth_range(&self) -> Option<Range<usize>> {
        self.want_depth.then(|| {
            let start = self.rgb_range().end;
            start..start + self.pixels * DEPTH_BYTES_PER_PIXEL
        })
    }

    pub fn model_view_range(&self) -> Option<Range<usize>> {
        let start = self.depth_range()?.end;
        Some(start..start + MATRIX_BYTES)
    }

    pub fn projection_range(&self) -> Option<Range<usize>> {
        let start = self.model_view_range()?.end;
        Some(start..start + MATRIX_BYTES)
    }
}

#[cfg(test)]
#[path = "frame_layout_tests.rs"]
mod tests;
