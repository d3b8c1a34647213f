/// Capture parameters, as supplied by the mission layer.
///
/// The mission describes the video producer as
/// `{"Width": 320, "Height": 240, "want_depth": true, "Viewpoint": 0}`.
/// `want_depth` defaults to false and `Viewpoint` to first person.

use glam::UVec2;
use serde::Deserialize;
use crate::error::{Error, Result};
use crate::render_context::Viewpoint;

/// Parameters of one capture session (immutable once prepared)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CaptureParameters {
    /// Output width in pixels
    #[serde(rename = "Width")]
    pub width: u32,
    /// Output height in pixels
    #[serde(rename = "Height")]
    pub height: u32,
    /// Append depth and camera matrices to every frame
    #[serde(default)]
    pub want_depth: bool,
    /// Camera mode forwarded to the renderer
    #[serde(rename = "Viewpoint", default)]
    pub viewpoint: Viewpoint,
}

impl CaptureParameters {
    pub fn new(width: u32, height: u32, want_depth: bool, viewpoint: Viewpoint) -> Self {
        Self { width, height, want_depth, viewpoint }
    }

    /// Parse a JSON parameter document
    ///
    /// # Errors
    ///
    /// `ConfigurationError` when the document is malformed, a required field
    /// is missing, a field has the wrong type or the viewpoint is unknown.
    pub fn from_json(document: &str) -> Result<Self> {
        serde_json::from_str(document)
            .map_err(|err| Error::ConfigurationError(format!("invalid capture parameters: {}", err)))
    }

    /// Parse an already-decoded JSON value
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        Self::deserialize(value)
            .map_err(|err| Error::ConfigurationError(format!("invalid capture parameters: {}", err)))
    }

    /// Output size in pixels
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }
}

#[cfg(test)]
#[path = "parameters_tests.rs"]
mod tests;
