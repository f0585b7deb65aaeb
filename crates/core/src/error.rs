//! Error types for swivel layouts.

use crate::geometry::Axis;
use thiserror::Error;

/// Result type alias for layout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while computing a layout.
#[derive(Debug, Error)]
pub enum Error {
    /// Pose identifier not present in the catalog.
    #[error("Unknown pose: '{0}'")]
    UnknownPose(String),

    /// Module footprint exceeds the platform extent on an axis.
    #[error("Module '{module}' does not fit: footprint {footprint} exceeds platform extent {extent} on the {axis} axis")]
    Oversize {
        /// Tag of the offending module.
        module: String,
        /// Axis on which the footprint overflows.
        axis: Axis,
        /// Footprint extent along `axis`.
        footprint: f64,
        /// Platform extent along `axis`.
        extent: f64,
    },

    /// Degenerate or unspecified pivot axis.
    #[error("Invalid pivot: {0}")]
    InvalidPivot(String),

    /// Negative or non-finite thickness/clearance, or unknown tier.
    #[error("Invalid level {index}: {reason}")]
    InvalidLevel {
        /// Tier index (0-based).
        index: usize,
        /// What is wrong with the tier.
        reason: String,
    },

    /// Invalid module or support geometry.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Invalid platform.
    #[error("Invalid boundary: {0}")]
    InvalidBoundary(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error.
    #[cfg(feature = "serde")]
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The geometry kernel rejected a request.
    #[error("Kernel error: {0}")]
    Kernel(String),
}
