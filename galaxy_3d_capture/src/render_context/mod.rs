//! Render context module - the rendering backend as seen by the captor
//!
//! The renderer keeps ambient state (active read/draw targets, current
//! transform matrices, camera mode). `RenderContext` turns that state into an
//! explicit capability that is passed to every capture operation.

mod binding;
mod headless_context;

#[cfg(test)]
pub(crate) mod mock_render_context;

pub use binding::BoundTarget;
pub use headless_context::{ContextStats, HeadlessContext, SoftwareSurface};

use bitflags::bitflags;
use glam::{Mat4, UVec2};
use serde::Deserialize;
use slotmap::new_key_type;
use crate::error::{Error, Result};

new_key_type! {
    /// Key of an off-screen render target owned by a backend
    pub struct RenderTargetKey;
}

/// Identifies a render target: the live display or an off-screen target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTargetId {
    /// The default target the engine renders the live frame into
    Display,
    /// An off-screen color + depth target
    Offscreen(RenderTargetKey),
}

/// Read and draw target bindings, saved and restored as one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetBindings {
    /// Source of readbacks and blits
    pub read: RenderTargetId,
    /// Destination of rendering and blits
    pub draw: RenderTargetId,
}

impl TargetBindings {
    /// Bindings with `read` and `draw` set independently
    pub fn new(read: RenderTargetId, draw: RenderTargetId) -> Self {
        Self { read, draw }
    }

    /// Both bind points on the display
    pub fn display() -> Self {
        Self::new(RenderTargetId::Display, RenderTargetId::Display)
    }
}

bitflags! {
    /// Planes transferred by a blit
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BlitMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
    }
}

/// Camera mode requested from the renderer
///
/// Encoded as the renderer's third-person setting: 0, 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "u8")]
pub enum Viewpoint {
    /// Camera at the eyes of the observed entity
    #[default]
    FirstPerson,
    /// Camera behind the observed entity
    ThirdPersonBack,
    /// Camera in front of the observed entity, looking back
    ThirdPersonFront,
}

impl Viewpoint {
    /// Renderer encoding of the viewpoint
    pub fn as_u8(self) -> u8 {
        match self {
            Viewpoint::FirstPerson => 0,
            Viewpoint::ThirdPersonBack => 1,
            Viewpoint::ThirdPersonFront => 2,
        }
    }
}

impl TryFrom<u8> for Viewpoint {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Viewpoint::FirstPerson),
            1 => Ok(Viewpoint::ThirdPersonBack),
            2 => Ok(Viewpoint::ThirdPersonFront),
            other => Err(Error::ConfigurationError(format!(
                "unknown viewpoint {} (expected 0, 1 or 2)", other
            ))),
        }
    }
}

/// Rendering backend capability used by the captor
///
/// All methods must be called on the thread that owns the rendering state.
/// Readback methods block until the backend has produced the data.
pub trait RenderContext {
    /// Size of the live display target in pixels
    fn display_size(&self) -> UVec2;

    /// Create an off-screen target with color and depth attachments of `size`
    fn create_render_target(&mut self, size: UVec2) -> Result<RenderTargetId>;

    /// Destroy an off-screen target and its attachments
    fn destroy_render_target(&mut self, target: RenderTargetId) -> Result<()>;

    /// Currently bound read and draw targets
    fn bindings(&self) -> TargetBindings;

    /// Replace the read and draw bindings
    fn bind(&mut self, bindings: TargetBindings);

    /// Render the current frame into the bound draw target at `size`
    fn render_frame(&mut self, size: UVec2) -> Result<()>;

    /// Copy `src_size` of the read target onto `dst_size` of the draw target
    /// with nearest-neighbour resampling
    fn blit(&mut self, src_size: UVec2, dst_size: UVec2, mask: BlitMask) -> Result<()>;

    /// Read `size` pixels of the read target as packed RGB bytes, bottom row first
    fn read_rgb(&mut self, size: UVec2, dst: &mut [u8]) -> Result<()>;

    /// Read `size` pixels of the read target's depth plane, bottom row first
    fn read_depth(&mut self, size: UVec2, dst: &mut [f32]) -> Result<()>;

    /// Current model-view matrix
    fn model_view_matrix(&self) -> Mat4;

    /// Current projection matrix
    fn projection_matrix(&self) -> Mat4;

    /// Switch the active camera mode
    fn set_viewpoint(&mut self, viewpoint: Viewpoint);
}
