//! Error types for Galaxy3D frame capture
//!
//! Every failure surfaced by the captor falls into one of four classes:
//! bad parameters, resources that could not be created, calls made in the
//! wrong lifecycle state, and backend failures during readback.

use std::fmt;

/// Result type for capture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Frame capture errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Capture parameters missing or of the wrong shape
    ConfigurationError(String),

    /// Capture target or staging buffer could not be created (not retried)
    ResourceAllocationError(String),

    /// Operation invoked in the wrong state, or with an undersized buffer
    PreconditionViolation(String),

    /// The rendering backend failed mid-readback; the whole frame is lost
    BackendReadbackError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            Error::ResourceAllocationError(msg) => write!(f, "Resource allocation error: {}", msg),
            Error::PreconditionViolation(msg) => write!(f, "Precondition violation: {}", msg),
            Error::BackendReadbackError(msg) => write!(f, "Backend readback error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error and return it from the enclosing function
///
/// # Example
///
/// ```ignore
/// capture_bail!("galaxy3d::capture::VideoCaptor", PreconditionViolation,
///     "capture_frame called before prepare");
/// ```
#[macro_export]
macro_rules! capture_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::capture_error!($source, "{}", message);
        return Err($crate::galaxy3d::Error::$variant(message));
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
