/// Typed views over a packed frame buffer.
///
/// The same bytes are accessed at two element widths: the RGB region as
/// `u8`, the depth and matrix regions as native-endian `f32`. The float
/// regions start at arbitrary byte offsets, so floats are copied through
/// byte slices instead of casting the buffer to `&mut [f32]`.
///
/// `PackedFrameBuffer` is the writer used while capturing. `PackedFrame` is
/// the read-only decoder for consumers of the wire format.

use std::mem::size_of;
use std::ops::Range;
use glam::Mat4;
use crate::error::{Error, Result};
use crate::capture_bail;
use super::frame_layout::{FrameLayout, MATRIX_FLOATS, RGB_BYTES_PER_PIXEL};

const SOURCE: &str = "galaxy3d::capture::PackedFrameBuffer";

fn check_length(len: usize, layout: &FrameLayout) -> Result<()> {
    if len < layout.required_buffer_size() {
        capture_bail!(SOURCE, PreconditionViolation,
            "buffer holds {} bytes, a {}x{} frame needs {}",
            len, layout.size().x, layout.size().y, layout.required_buffer_size());
    }
    Ok(())
}

/// Decode native-endian floats from a byte run of any alignment
fn decode_floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(size_of::<f32>())
        .map(bytemuck::pod_read_unaligned::<f32>)
        .collect()
}

/// Reverse the row order of a bottom-row-first image
fn flip_rows<T: Copy>(data: &[T], row_len: usize) -> Vec<T> {
    data.chunks_exact(row_len).rev().flatten().copied().collect()
}

fn missing_region(what: &str) -> Error {
    Error::PreconditionViolation(format!("frame was packed without depth, it has no {}", what))
}

// ============================================================================
// PackedFrameBuffer
// ============================================================================

/// Writable packed frame over a caller-owned byte buffer
pub struct PackedFrameBuffer<'a> {
    bytes: &'a mut [u8],
    layout: FrameLayout,
}

impl<'a> PackedFrameBuffer<'a> {
    /// Wrap `bytes`, which must hold at least `layout.required_buffer_size()`
    ///
    /// Only the first `required_buffer_size()` bytes are ever written.
    pub fn new(bytes: &'a mut [u8], layout: FrameLayout) -> Result<Self> {
        check_length(bytes.len(), &layout)?;
        Ok(Self { bytes, layout })
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Byte view of the packed frame
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.layout.required_buffer_size()]
    }

    /// Byte view of the RGB region
    pub fn rgb_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[self.layout.rgb_range()]
    }

    /// Float view: store `values` starting at `byte_offset`
    pub fn write_floats(&mut self, byte_offset: usize, values: &[f32]) -> Result<()> {
        let range = self.float_range(byte_offset, values.len())?;
        self.bytes[range].copy_from_slice(bytemuck::cast_slice(values));
        Ok(())
    }

    /// Float view: load `count` floats starting at `byte_offset`
    pub fn read_floats(&self, byte_offset: usize, count: usize) -> Result<Vec<f32>> {
        let range = self.float_range(byte_offset, count)?;
        Ok(decode_floats(&self.bytes[range]))
    }

    /// Store one depth sample per pixel in the depth region
    pub fn write_depth(&mut self, samples: &[f32]) -> Result<()> {
        let range = self.layout.depth_range().ok_or_else(|| missing_region("depth region"))?;
        if samples.len() != self.layout.pixel_count() {
            capture_bail!(SOURCE, PreconditionViolation,
                "{} depth samples for a {} pixel frame", samples.len(), self.layout.pixel_count());
        }
        self.write_floats(range.start, samples)
    }

    /// Store the model-view matrix, column-major
    pub fn write_model_view(&mut self, matrix: &Mat4) -> Result<()> {
        let range = self.layout.model_view_range().ok_or_else(|| missing_region("model-view matrix"))?;
        self.write_floats(range.start, &matrix.to_cols_array())
    }

    /// Store the projection matrix, column-major
    pub fn write_projection(&mut self, matrix: &Mat4) -> Result<()> {
        let range = self.layout.projection_range().ok_or_else(|| missing_region("projection matrix"))?;
        self.write_floats(range.start, &matrix.to_cols_array())
    }

    fn float_range(&self, byte_offset: usize, count: usize) -> Result<Range<usize>> {
        let end = count
            .checked_mul(size_of::<f32>())
            .and_then(|len| byte_offset.checked_add(len));
        match end {
            Some(end) if end <= self.layout.required_buffer_size() => Ok(byte_offset..end),
            _ => capture_bail!(SOURCE, PreconditionViolation,
                "{} floats at byte {} overrun a {} byte frame",
                count, byte_offset, self.layout.required_buffer_size()),
        }
    }
}

// ============================================================================
// PackedFrame
// ============================================================================

/// Read-only decoder of a packed frame
pub struct PackedFrame<'a> {
    bytes: &'a [u8],
    layout: FrameLayout,
}

impl<'a> PackedFrame<'a> {
    pub fn new(bytes: &'a [u8], layout: FrameLayout) -> Result<Self> {
        check_length(bytes.len(), &layout)?;
        Ok(Self { bytes, layout })
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// RGB bytes as read back, bottom row first
    pub fn rgb(&self) -> &'a [u8] {
        &self.bytes[self.layout.rgb_range()]
    }

    /// RGB bytes reordered top row first
    pub fn rgb_top_down(&self) -> Vec<u8> {
        flip_rows(self.rgb(), self.layout.size().x as usize * RGB_BYTES_PER_PIXEL)
    }

    /// Depth samples, bottom row first
    pub fn depth(&self) -> Option<Vec<f32>> {
        self.layout.depth_range().map(|range| decode_floats(&self.bytes[range]))
    }

    /// Depth samples reordered top row first
    pub fn depth_top_down(&self) -> Option<Vec<f32>> {
        let depth = self.depth()?;
        Some(flip_rows(&depth, self.layout.size().x as usize))
    }

    pub fn model_view(&self) -> Option<Mat4> {
        self.matrix(self.layout.model_view_range()?)
    }

    pub fn projection(&self) -> Option<Mat4> {
        self.matrix(self.layout.projection_range()?)
    }

    fn matrix(&self, range: Range<usize>) -> Option<Mat4> {
        let floats = decode_floats(&self.bytes[range]);
        (floats.len() == MATRIX_FLOATS).then(|| Mat4::from_cols_slice(&floats))
    }
}

#[cfg(test)]
#[path = "packed_frame_tests.rs"]
mod tests;
