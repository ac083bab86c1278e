//! Scan Error Types
//!
//! Only failures that end a whole scan live here. Anything that goes wrong
//! with a single file becomes an [`Outcome`](crate::Outcome) instead and
//! never leaves its worker.

use derive_more::{Display, Error};

/// A scan error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The index file itself could not be downloaded.
    #[display("could not fetch index")]
    Fetch,
    /// The downloaded bytes are not an index we can read.
    #[display("invalid index")]
    Format,
    /// The destination could not be written to.
    #[display("could not write to destination")]
    Storage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch)
    }
}
