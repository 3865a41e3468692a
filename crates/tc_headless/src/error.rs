//! Error types for the headless driver.

use thiserror::Error;

use tc_core::error::StateError;

/// Result type alias for headless operations.
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Errors raised while driving a session.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// Reading input or writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An input line is not a valid message.
    #[error("line {line}: {source}")]
    Json {
        /// 1-based input line number.
        line: usize,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Engine configuration was rejected.
    #[error(transparent)]
    Core(#[from] StateError),
}
