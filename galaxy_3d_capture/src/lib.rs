/*!
# Galaxy 3D Capture

Frame capture for the Galaxy 3D engine.

Each simulation step, a `VideoCaptor` copies the frame the engine just
rendered into an off-screen target at the requested output resolution, reads
it back and packs it into a flat byte buffer for downstream consumers: RGB,
optionally followed by per-pixel depth and the camera's model-view and
projection matrices.

## Architecture

- **RenderContext**: Trait the rendering backend implements (targets, blits, readbacks)
- **HeadlessContext**: Software backend with no GPU or window
- **VideoCaptor**: Prepare / capture / cleanup lifecycle of one session
- **FramePacker**: RGB-only and RGB + depth + matrices packing strategies
- **PackedFrame**: Read-side view over a packed buffer

The captor is single-threaded: every call must run on the thread that owns
the render context.
*/

// Internal modules
mod error;
pub mod log;
pub mod render_context;
pub mod capture;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module (types and logger installation; macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }

    // Render backend sub-module
    pub mod render {
        pub use crate::render_context::*;
    }

    // Capture sub-module
    pub mod capture {
        pub use crate::capture::*;
    }
}

// Re-export math library at crate root
pub use glam;
