//! Errors raised by the terrain core.

use thiserror::Error;

/// Errors that can abort a generation pass.
///
/// Both variants are detected before any per-cell work starts, so a failed
/// call never leaves a partially written tile behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    /// The shared generation parameters cannot produce a valid result.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Grid dimensions of two collaborating buffers do not agree.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
}

impl TerrainError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Returns true for configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true for shape mismatches.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch(_))
    }
}
