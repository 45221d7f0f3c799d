//! Error types for djmir.
//!
//! All fallible operations return [`Result`], whose error type is [`DjmirError`].
//! Numeric degeneracies (empty documents, `mu = 0`) are never reported here; the
//! scorer absorbs them with explicit probability floors.
//!
//! # Examples
//!
//! ```
//! use djmir::error::{DjmirError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(DjmirError::invalid_argument("sampling fraction must be in (0, 1]"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for djmir operations.
#[derive(Error, Debug)]
pub enum DjmirError {
    /// I/O errors (query file unreadable, result file unwritable, ...)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid or missing configuration (index path, config file, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Index read failures and unknown document ids
    #[error("Index error: {0}")]
    Index(String),

    /// A single malformed input line.
    #[error("Malformed input on line {line_number}: {line:?}")]
    MalformedInput {
        /// 1-based line number in the source file.
        line_number: usize,
        /// The offending line, verbatim.
        line: String,
    },

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid argument passed to an operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation cancelled through a cancellation token
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with DjmirError.
pub type Result<T> = std::result::Result<T, DjmirError>;

impl DjmirError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        DjmirError::Configuration(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        DjmirError::Index(msg.into())
    }

    /// Create a new malformed input error.
    pub fn malformed_input<S: Into<String>>(line_number: usize, line: S) -> Self {
        DjmirError::MalformedInput {
            line_number,
            line: line.into(),
        }
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        DjmirError::Analysis(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        DjmirError::InvalidArgument(msg.into())
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        DjmirError::OperationCancelled(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        DjmirError::Other(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        DjmirError::Other(format!("Internal error: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = DjmirError::index("Test index error");
        assert_eq!(error.to_string(), "Index error: Test index error");

        let error = DjmirError::configuration("missing index");
        assert_eq!(error.to_string(), "Configuration error: missing index");

        let error = DjmirError::malformed_input(3, "Q7");
        assert_eq!(error.to_string(), "Malformed input on line 3: \"Q7\"");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = DjmirError::from(io_error);

        match error {
            DjmirError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
