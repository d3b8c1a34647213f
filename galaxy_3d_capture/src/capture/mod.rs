//! Frame capture module
//!
//! Renders or blits the current frame into an off-screen target at the
//! requested output size, reads it back and packs it into a caller-supplied
//! byte buffer:
//!
//! ```text
//! [ RGB, 3*P bytes ][ depth, 4*P bytes ][ model-view, 64 ][ projection, 64 ]
//! ```
//!
//! with P = width * height. The last three regions are present only when
//! depth is requested. Rows are bottom-to-top.

mod parameters;
mod frame_layout;
mod packed_frame;
mod depth_staging;
mod capture_target;
mod frame_packer;
mod video_captor;

pub use parameters::CaptureParameters;
pub use frame_layout::{
    FrameLayout,
    RGB_BYTES_PER_PIXEL, DEPTH_BYTES_PER_PIXEL, MATRIX_FLOATS, MATRIX_BYTES,
};
pub use packed_frame::{PackedFrame, PackedFrameBuffer};
pub use depth_staging::DepthStagingBuffer;
pub use capture_target::CaptureTarget;
pub use frame_packer::FramePacker;
pub use video_captor::{CaptorPhase, VideoCaptor};

pub use crate::render_context::Viewpoint;
