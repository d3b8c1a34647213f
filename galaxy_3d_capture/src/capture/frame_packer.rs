/// Frame packer - produces one packed frame per call.
///
/// Two variants, selected by `want_depth`:
///
/// - `RgbOnly`: render the current frame into the capture target at output
///   size and read the RGB bytes straight into the destination.
/// - `RgbWithDepthAndMatrices`: blit display color + depth into the capture
///   target (nearest), read RGB into the destination and depth into the
///   staging buffer, copy depth after the RGB run, then append the
///   model-view and projection matrices.
///
/// Readbacks are synchronous and stall the render thread until the backend
/// returns the data. A failure anywhere loses the whole frame.

use crate::error::Result;
use crate::capture_bail;
use crate::render_context::{BlitMask, RenderContext};
use super::capture_target::CaptureTarget;
use super::depth_staging::DepthStagingBuffer;
use super::frame_layout::FrameLayout;
use super::packed_frame::PackedFrameBuffer;

const SOURCE: &str = "galaxy3d::capture::FramePacker";

#[derive(Debug)]
pub enum FramePacker {
    /// Color only, 3 bytes per pixel
    RgbOnly,
    /// Color, per-pixel depth and the camera matrices
    RgbWithDepthAndMatrices {
        /// Reused across frames
        depth_staging: DepthStagingBuffer,
    },
}

impl FramePacker {
    /// Packer matching `layout`, allocating the depth staging buffer if needed
    pub fn for_layout(layout: &FrameLayout) -> Result<Self> {
        if layout.want_depth() {
            Ok(FramePacker::RgbWithDepthAndMatrices {
                depth_staging: DepthStagingBuffer::new(layout.pixel_count())?,
            })
        } else {
            Ok(FramePacker::RgbOnly)
        }
    }

    pub fn wants_depth(&self) -> bool {
        matches!(self, FramePacker::RgbWithDepthAndMatrices { .. })
    }

    /// Capture the current frame into `destination`
    ///
    /// `destination` must hold at least `layout.required_buffer_size()`
    /// bytes; nothing past that is touched.
    pub fn capture_frame(
        &mut self,
        context: &mut dyn RenderContext,
        target: &CaptureTarget,
        layout: &FrameLayout,
        destination: &mut [u8],
    ) -> Result<()> {
        if target.size() != layout.size() {
            capture_bail!(SOURCE, PreconditionViolation,
                "capture target is {}x{} but the frame is {}x{}",
                target.size().x, target.size().y, layout.size().x, layout.size().y);
        }
        if self.wants_depth() != layout.want_depth() {
            capture_bail!(SOURCE, PreconditionViolation,
                "packer and frame layout disagree on depth");
        }

        let mut frame = PackedFrameBuffer::new(destination, *layout)?;
        match self {
            FramePacker::RgbOnly => Self::pack_rgb(context, target, &mut frame),
            FramePacker::RgbWithDepthAndMatrices { depth_staging } => {
                Self::pack_rgb_depth(context, target, depth_staging, &mut frame)
            }
        }
    }

    fn pack_rgb(
        context: &mut dyn RenderContext,
        target: &CaptureTarget,
        frame: &mut PackedFrameBuffer,
    ) -> Result<()> {
        let size = target.size();

        {
            let mut bound = target.bind_for_write(context);
            bound.render_frame(size)?;
        }
        {
            let mut bound = target.bind_for_read(context);
            bound.read_rgb(size, frame.rgb_mut())?;
        }

        crate::capture_trace!(SOURCE, "Packed {}x{} RGB frame", size.x, size.y);
        Ok(())
    }

    fn pack_rgb_depth(
        context: &mut dyn RenderContext,
        target: &CaptureTarget,
        depth_staging: &mut DepthStagingBuffer,
        frame: &mut PackedFrameBuffer,
    ) -> Result<()> {
        let size = target.size();
        let display_size = context.display_size();

        {
            let mut bound = target.bind_for_write(context);
            bound.blit(display_size, size, BlitMask::COLOR | BlitMask::DEPTH)?;
        }
        {
            let mut bound = target.bind_for_read(context);
            bound.read_rgb(size, frame.rgb_mut())?;
            depth_staging.read_from(&mut *bound, size)?;
        }

        frame.write_depth(depth_staging.samples())?;
        depth_staging.clear();

        frame.write_model_view(&context.model_view_matrix())?;
        frame.write_projection(&context.projection_matrix())?;

        crate::capture_trace!(SOURCE, "Packed {}x{} RGB + depth frame", size.x, size.y);
        Ok(())
    }
}

#[cfg(test)]
#[path = "frame_packer_tests.rs"]
mod tests;
