//! Error types for the lexbloom library.
//!
//! Every fallible operation returns [`Result`], whose error type is the
//! [`LexbloomError`] enum. Errors raised inside a corpus pipeline are local to
//! that corpus: the coordinator records them and keeps going.
//!
//! # Examples
//!
//! ```
//! use lexbloom::error::{LexbloomError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(LexbloomError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// The main error type for lexbloom operations.
#[derive(Error, Debug)]
pub enum LexbloomError {
    /// I/O errors (corpus cannot be opened or read)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Memory exhaustion while ingesting tokens
    #[error("Allocation error: {0}")]
    Allocation(String),

    /// Invalid configuration or argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Worker thread errors
    #[error("Thread join error: {0}")]
    ThreadJoin(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with LexbloomError.
pub type Result<T> = std::result::Result<T, LexbloomError>;

impl LexbloomError {
    /// Create a new allocation error.
    pub fn allocation<S: Into<String>>(msg: S) -> Self {
        LexbloomError::Allocation(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        LexbloomError::InvalidArgument(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        LexbloomError::InvalidArgument(format!("configuration: {}", msg.into()))
    }

    /// Create a new thread join error.
    pub fn thread_join<S: Into<String>>(msg: S) -> Self {
        LexbloomError::ThreadJoin(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        LexbloomError::Other(format!("Internal error: {}", msg.into()))
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LexbloomError::Other(msg.into())
    }

    /// Short machine-friendly name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            LexbloomError::Io(_) => "io",
            LexbloomError::Allocation(_) => "allocation",
            LexbloomError::InvalidArgument(_) => "invalid_argument",
            LexbloomError::ThreadJoin(_) => "thread_join",
            LexbloomError::Json(_) => "json",
            LexbloomError::Other(_) => "other",
        }
    }
}

impl From<TryReserveError> for LexbloomError {
    fn from(e: TryReserveError) -> Self {
        LexbloomError::Allocation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = LexbloomError::allocation("out of memory");
        assert_eq!(error.to_string(), "Allocation error: out of memory");

        let error = LexbloomError::invalid_config("k must be positive");
        assert_eq!(
            error.to_string(),
            "Invalid argument: configuration: k must be positive"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = LexbloomError::from(io_error);

        match error {
            LexbloomError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
        assert_eq!(error.kind(), "io");
    }

    #[test]
    fn test_try_reserve_conversion() {
        let mut v: Vec<u8> = Vec::new();
        let err = v.try_reserve(usize::MAX).unwrap_err();
        let error = LexbloomError::from(err);
        assert_eq!(error.kind(), "allocation");
    }
}
