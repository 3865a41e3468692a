//! Error types for the state engine.
//!
//! The update paths never fail; these errors surface from accessors that
//! guard a precondition, from configuration loading and from frame
//! snapshot encoding.

use thiserror::Error;

/// Result type alias using [`StateError`].
pub type Result<T> = std::result::Result<T, StateError>;

/// Top-level error type for the state engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// The filtered alive-units map was read while no unit types are considered.
    #[error("Considered unit types are empty; the filtered alive-units map is invalid")]
    ConsideredTypesEmpty,

    /// Image mode is enabled but the frame carried no image data.
    #[error("Frame carries no image data")]
    MissingImage,

    /// An image or visibility buffer does not match its declared size.
    #[error("Invalid {what} buffer: expected {expected} bytes, got {actual}")]
    ImageSizeMismatch {
        /// Which buffer was malformed.
        what: &'static str,
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },

    /// Unknown unit type name in configuration.
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    /// Configuration file parsing error.
    #[error("Failed to parse config '{path}': {message}")]
    ConfigParse {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Frame snapshot encoding or decoding failed.
    #[error("Frame snapshot error: {0}")]
    Snapshot(String),
}
