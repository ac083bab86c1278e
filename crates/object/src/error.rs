//! Object Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// An object decoding error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for object decoding.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes are not a valid zlib stream. Don't retry with the same input.
    #[display("invalid or corrupted object data")]
    Inflate,
    /// The zlib stream stopped before its end marker (cut-off download).
    #[display("object data ended unexpectedly")]
    Incomplete,
    /// A header was present but unreadable (non-numeric or overflowing size).
    #[display("malformed object header: {_0}")]
    Header(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A fresh download might not be corrupt, but that's the caller's call
        // (and the caller doesn't retry).
        false
    }
}
