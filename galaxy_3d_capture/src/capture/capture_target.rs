/// Off-screen capture target.
///
/// A color + depth render target sized to the requested output, independent
/// of the display resolution. Owned by one captor, created at prepare time
/// and destroyed at cleanup.

use glam::UVec2;
use crate::error::Result;
use crate::capture_bail;
use crate::render_context::{BoundTarget, RenderContext, RenderTargetId, TargetBindings};

const SOURCE: &str = "galaxy3d::capture::CaptureTarget";

#[derive(Debug)]
pub struct CaptureTarget {
    id: RenderTargetId,
    size: UVec2,
    released: bool,
}

impl CaptureTarget {
    /// Create a `width` x `height` color + depth target
    ///
    /// # Errors
    ///
    /// `ResourceAllocationError` for a zero dimension or when the backend
    /// cannot create the target. Not retried.
    pub fn allocate(context: &mut dyn RenderContext, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            capture_bail!(SOURCE, ResourceAllocationError,
                "cannot allocate a {}x{} capture target", width, height);
        }

        let size = UVec2::new(width, height);
        let id = match context.create_render_target(size) {
            Ok(id) => id,
            Err(err) => capture_bail!(SOURCE, ResourceAllocationError,
                "backend could not create a {}x{} capture target: {}", width, height, err),
        };

        crate::capture_debug!(SOURCE, "Allocated {}x{} capture target", width, height);
        Ok(Self { id, size, released: false })
    }

    pub fn id(&self) -> RenderTargetId {
        self.id
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Make this target the draw target, with the display as read source
    ///
    /// Previous bindings come back when the guard is dropped.
    pub fn bind_for_write<'a>(&self, context: &'a mut dyn RenderContext) -> BoundTarget<'a> {
        BoundTarget::bind(context, TargetBindings::new(RenderTargetId::Display, self.id))
    }

    /// Make this target the read (and draw) target
    ///
    /// Previous bindings come back when the guard is dropped.
    pub fn bind_for_read<'a>(&self, context: &'a mut dyn RenderContext) -> BoundTarget<'a> {
        BoundTarget::bind(context, TargetBindings::new(self.id, self.id))
    }

    /// Destroy the target and its attachments
    pub fn release(mut self, context: &mut dyn RenderContext) -> Result<()> {
        self.released = true;
        if let Err(err) = context.destroy_render_target(self.id) {
            capture_bail!(SOURCE, ResourceAllocationError,
                "failed to release {}x{} capture target: {}", self.size.x, self.size.y, err);
        }
        crate::capture_debug!(SOURCE, "Released {}x{} capture target", self.size.x, self.size.y);
        Ok(())
    }
}

impl Drop for CaptureTarget {
    fn drop(&mut self) {
        if !self.released {
            crate::capture_warn!(SOURCE,
                "{}x{} capture target dropped without release, backend memory leaked",
                self.size.x, self.size.y);
        }
    }
}

#[cfg(test)]
#[path = "capture_target_tests.rs"]
mod tests;
