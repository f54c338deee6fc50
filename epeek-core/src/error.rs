//! Structured error types for the ePeek widgets.

use thiserror::Error;

/// Unified error type for all ePeek operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EpeekError {
    /// Malformed input text. `position` is the byte offset of the offending token.
    #[error("parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    /// Invalid input (bad arguments, unknown nodes, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network or REST service failure
    #[error("fetch error: {0}")]
    Fetch(String),

    /// A response body that could not be decoded
    #[error("json error: {0}")]
    Json(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

impl EpeekError {
    /// Shorthand for a [`EpeekError::Parse`] at `position`.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the ePeek crates.
pub type Result<T> = std::result::Result<T, EpeekError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_reports_position() {
        let e = EpeekError::parse(7, "unbalanced ')'");
        assert_eq!(e.to_string(), "parse error at byte 7: unbalanced ')'");
    }

    #[test]
    fn invalid_input_display() {
        let e = EpeekError::InvalidInput("empty node list".into());
        assert_eq!(e.to_string(), "invalid input: empty node list");
    }
}
