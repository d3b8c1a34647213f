/// Reusable host-side buffer for depth readback.
///
/// Allocated once at prepare time with one sample per pixel. Each capture
/// fills it, copies it out and resets the cursor; the storage itself is only
/// freed with the buffer.

use glam::UVec2;
use crate::error::Result;
use crate::capture_bail;
use crate::render_context::RenderContext;

const SOURCE: &str = "galaxy3d::capture::DepthStagingBuffer";

#[derive(Debug)]
pub struct DepthStagingBuffer {
    samples: Vec<f32>,
    len: usize,
}

impl DepthStagingBuffer {
    /// Allocate room for `capacity` samples
    pub fn new(capacity: usize) -> Result<Self> {
        let mut samples = Vec::new();
        if samples.try_reserve_exact(capacity).is_err() {
            capture_bail!(SOURCE, ResourceAllocationError,
                "cannot allocate {} depth samples", capacity);
        }
        samples.resize(capacity, 0.0);
        Ok(Self { samples, len: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Samples held since the last read
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the depth plane of the bound read target
    pub fn read_from(&mut self, context: &mut dyn RenderContext, size: UVec2) -> Result<&[f32]> {
        let pixels = size.x as usize * size.y as usize;
        if pixels > self.capacity() {
            capture_bail!(SOURCE, PreconditionViolation,
                "{}x{} depth read exceeds {} staged samples", size.x, size.y, self.capacity());
        }

        self.len = 0;
        context.read_depth(size, &mut self.samples[..pixels])?;
        self.len = pixels;
        Ok(&self.samples[..pixels])
    }

    /// Samples held since the last read
    pub fn samples(&self) -> &[f32] {
        &self.samples[..self.len]
    }

    /// Reset the cursor; contents are left in place
    pub fn clear(&mut self) {
        self.len = 0;
    }
}
