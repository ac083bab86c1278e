//! Index Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, the same way every other crate in this workspace does.

use derive_more::{Display, Error};

/// An index decoding error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for index decoding.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The buffer does not start with `DIRC`; it isn't an index file at all.
    #[display("bad signature")]
    Signature,
    /// The header is fine but the format version is not one we can decode.
    #[display("unsupported version: {_0}")]
    UnsupportedVersion(#[error(not(source))] u32),
    /// The buffer ended in the middle of a record. Entries decoded before
    /// this point are still valid.
    #[display("index truncated: needed {needed} bytes at offset {offset}")]
    Truncated {
        /// Cursor position when the read was attempted.
        offset: usize,
        /// Number of bytes the read asked for.
        needed: usize,
    },
    /// A hex string could not be turned into an object id.
    #[display("invalid object id: {_0}")]
    InvalidObjectId(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Same bytes, same answer.
        false
    }

    /// Header problems: nothing can be decoded from this buffer.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Signature | Self::UnsupportedVersion(_))
    }

    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}
