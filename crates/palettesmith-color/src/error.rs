//! Error types for color parsing.

use thiserror::Error;

/// Errors returned by [`normalize`](crate::normalize).
///
/// Parse failures are always surfaced to the caller; the engine never
/// substitutes a default color for unparseable input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// The input was empty or whitespace only.
    #[error("color input cannot be empty")]
    Empty,

    /// The hex body contains characters outside `0-9a-f`.
    #[error("invalid hex color '{input}': contains non-hex characters")]
    InvalidCharacter { input: String },

    /// The hex body is not 3, 6 or 8 digits long.
    #[error("invalid hex color '{input}': {len} digits (expected 3, 6 or 8)")]
    InvalidLength { input: String, len: usize },

    /// An `rgb()`/`rgba()`/`hsl()`/`hsla()` form could not be read.
    #[error("invalid color function '{input}': {reason}")]
    InvalidFunction { input: String, reason: String },
}

impl ColorParseError {
    pub(crate) fn function(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFunction {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for color operations.
pub type Result<T> = std::result::Result<T, ColorParseError>;
