/// Video captor - owns the capture target and frame packer of one session.
///
/// Lifecycle:
///
/// ```text
/// Unconfigured --configure--> Configured --prepare--> Prepared --cleanup--> Released
///                                                      |    ^
///                                                      +----+ capture_frame
/// ```
///
/// `Released` is terminal. Every operation must run on the thread owning
/// the render context.
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_capture::galaxy3d::capture::{CaptureParameters, VideoCaptor, Viewpoint};
/// use galaxy_3d_capture::galaxy3d::render::HeadlessContext;
///
/// let mut ctx = HeadlessContext::new(800, 600)?;
/// let mut captor = VideoCaptor::with_parameters(
///     CaptureParameters::new(64, 64, true, Viewpoint::FirstPerson));
///
/// captor.prepare(&mut ctx)?;
/// let mut frame = vec![0u8; captor.required_buffer_size()?];
/// captor.capture_frame(&mut ctx, &mut frame)?;
/// captor.cleanup(&mut ctx)?;
/// # Ok::<(), galaxy_3d_capture::galaxy3d::Error>(())
/// ```

use crate::error::Result;
use crate::capture_bail;
use crate::render_context::RenderContext;
use super::capture_target::CaptureTarget;
use super::frame_layout::FrameLayout;
use super::frame_packer::FramePacker;
use super::parameters::CaptureParameters;

const SOURCE: &str = "galaxy3d::capture::VideoCaptor";

/// Lifecycle phase of a captor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptorPhase {
    Unconfigured,
    Configured,
    Prepared,
    Released,
}

/// Resources held between prepare and cleanup
#[derive(Debug)]
struct PreparedCapture {
    parameters: CaptureParameters,
    layout: FrameLayout,
    target: CaptureTarget,
    packer: FramePacker,
}

#[derive(Debug)]
enum CaptorState {
    Unconfigured,
    Configured(CaptureParameters),
    Prepared(PreparedCapture),
    Released,
}

#[derive(Debug)]
pub struct VideoCaptor {
    state: CaptorState,
}

impl VideoCaptor {
    /// Create an unconfigured captor
    pub fn new() -> Self {
        Self { state: CaptorState::Unconfigured }
    }

    /// Create a captor already configured with `parameters`
    pub fn with_parameters(parameters: CaptureParameters) -> Self {
        Self { state: CaptorState::Configured(parameters) }
    }

    // ===== CONFIGURATION =====

    /// Configure from the mission's parameter document
    ///
    /// # Errors
    ///
    /// `ConfigurationError` when `params` is missing or is not a valid
    /// video producer description. `PreconditionViolation` once prepared.
    pub fn parse_parameters(&mut self, params: Option<&serde_json::Value>) -> Result<()> {
        let Some(value) = params else {
            capture_bail!(SOURCE, ConfigurationError, "no capture parameters supplied");
        };
        let parameters = match CaptureParameters::from_value(value) {
            Ok(parameters) => parameters,
            Err(err) => {
                crate::capture_error!(SOURCE, "{}", err);
                return Err(err);
            }
        };
        self.configure(parameters)
    }

    /// Set the capture parameters; allowed until `prepare`
    pub fn configure(&mut self, parameters: CaptureParameters) -> Result<()> {
        match self.state {
            CaptorState::Unconfigured | CaptorState::Configured(_) => {
                self.state = CaptorState::Configured(parameters);
                Ok(())
            }
            _ => capture_bail!(SOURCE, PreconditionViolation,
                "cannot reconfigure a captor that is {:?}", self.phase()),
        }
    }

    // ===== ACCESSORS =====

    pub fn phase(&self) -> CaptorPhase {
        match self.state {
            CaptorState::Unconfigured => CaptorPhase::Unconfigured,
            CaptorState::Configured(_) => CaptorPhase::Configured,
            CaptorState::Prepared(_) => CaptorPhase::Prepared,
            CaptorState::Released => CaptorPhase::Released,
        }
    }

    /// Parameters in effect, if configured and not yet released
    pub fn parameters(&self) -> Option<&CaptureParameters> {
        match &self.state {
            CaptorState::Configured(parameters) => Some(parameters),
            CaptorState::Prepared(prepared) => Some(&prepared.parameters),
            CaptorState::Unconfigured | CaptorState::Released => None,
        }
    }

    pub fn width(&self) -> Option<u32> {
        self.parameters().map(|parameters| parameters.width)
    }

    pub fn height(&self) -> Option<u32> {
        self.parameters().map(|parameters| parameters.height)
    }

    /// Bytes the destination of `capture_frame` must hold
    ///
    /// # Errors
    ///
    /// `PreconditionViolation` without parameters, `ResourceAllocationError`
    /// for a zero or unaddressable size.
    pub fn required_buffer_size(&self) -> Result<usize> {
        match &self.state {
            CaptorState::Prepared(prepared) => Ok(prepared.layout.required_buffer_size()),
            CaptorState::Configured(parameters) => {
                Ok(FrameLayout::for_parameters(parameters)?.required_buffer_size())
            }
            _ => capture_bail!(SOURCE, PreconditionViolation,
                "buffer size requested from a captor that is {:?}", self.phase()),
        }
    }

    // ===== LIFECYCLE =====

    /// Allocate the capture target and depth staging buffer, and switch the
    /// renderer to the requested viewpoint
    ///
    /// The viewpoint change is a side effect on shared renderer state; restoring
    /// it is up to the caller.
    ///
    /// # Errors
    ///
    /// - `ResourceAllocationError` for a zero size or a backend failure
    /// - `PreconditionViolation` unless the captor is `Configured`
    pub fn prepare(&mut self, context: &mut dyn RenderContext) -> Result<()> {
        let parameters = match self.state {
            CaptorState::Configured(parameters) => parameters,
            CaptorState::Prepared(_) => capture_bail!(SOURCE, PreconditionViolation,
                "prepare called twice without cleanup"),
            _ => capture_bail!(SOURCE, PreconditionViolation,
                "prepare called on a captor that is {:?}", self.phase()),
        };

        let layout = FrameLayout::for_parameters(&parameters)?;
        let packer = FramePacker::for_layout(&layout)?;
        let target = CaptureTarget::allocate(context, parameters.width, parameters.height)?;
        context.set_viewpoint(parameters.viewpoint);

        crate::capture_info!(SOURCE,
            "Prepared {}x{} capture (depth: {}, viewpoint: {:?}, {} bytes per frame)",
            parameters.width, parameters.height, parameters.want_depth,
            parameters.viewpoint, layout.required_buffer_size());

        self.state = CaptorState::Prepared(PreparedCapture {
            parameters,
            layout,
            target,
            packer,
        });
        Ok(())
    }

    /// Capture the current frame into `destination`
    ///
    /// A failed capture leaves the captor prepared; the frame must be taken
    /// again from scratch on the next cycle.
    ///
    /// # Errors
    ///
    /// - `PreconditionViolation` unless prepared, or if `destination` is
    ///   shorter than `required_buffer_size()`
    /// - `BackendReadbackError` when the backend fails mid-capture
    pub fn capture_frame(&mut self, context: &mut dyn RenderContext, destination: &mut [u8]) -> Result<()> {
        let phase = self.phase();
        let PreparedCapture { layout, target, packer, .. } = match &mut self.state {
            CaptorState::Prepared(prepared) => prepared,
            _ => capture_bail!(SOURCE, PreconditionViolation,
                "capture_frame called on a captor that is {:?}", phase),
        };

        let result = packer.capture_frame(context, target, layout, destination);
        if let Err(err) = &result {
            crate::capture_error!(SOURCE, "Frame capture failed: {}", err);
        }
        result
    }

    /// Release the capture target; must be called exactly once
    ///
    /// Also valid after a failed capture, or before `prepare` (nothing to
    /// release). The captor is `Released` afterwards even if the backend
    /// reports an error.
    pub fn cleanup(&mut self, context: &mut dyn RenderContext) -> Result<()> {
        match std::mem::replace(&mut self.state, CaptorState::Released) {
            CaptorState::Prepared(prepared) => {
                prepared.target.release(context)?;
                crate::capture_info!(SOURCE, "Released {}x{} capture",
                    prepared.parameters.width, prepared.parameters.height);
                Ok(())
            }
            CaptorState::Unconfigured | CaptorState::Configured(_) => {
                crate::capture_debug!(SOURCE, "Cleanup before prepare, nothing to release");
                Ok(())
            }
            CaptorState::Released => capture_bail!(SOURCE, PreconditionViolation,
                "cleanup called twice"),
        }
    }
}

impl Default for VideoCaptor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "video_captor_tests.rs"]
mod tests;
