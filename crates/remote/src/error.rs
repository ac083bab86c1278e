//! Retrieval Error Types

use derive_more::{Display, Error};

/// A retrieval error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Every variant is a network error as far as a scan is concerned.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP client could not be constructed.
    #[display("could not build HTTP client")]
    Client,
    /// Connection, TLS or body transfer failure.
    #[display("request failed")]
    Request,
    /// The server answered, but not with a 2xx.
    #[display("unexpected HTTP status: {_0}")]
    Status(#[error(not(source))] u16),
    /// The per-request timeout elapsed.
    #[display("request timed out")]
    Timeout,
    /// Not something we can scan.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed. Nothing retries
    /// automatically; this only tells the user whether a re-run is worth it.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request | Self::Timeout => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::Client | Self::InvalidUrl(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Timeout, true)]
    #[case(ErrorKind::Request, true)]
    #[case(ErrorKind::Status(503), true)]
    #[case(ErrorKind::Status(429), true)]
    #[case(ErrorKind::Status(404), false)]
    #[case(ErrorKind::Status(403), false)]
    #[case(ErrorKind::InvalidUrl("ftp://x".to_string()), false)]
    fn test_is_retryable(#[case] kind: ErrorKind, #[case] retryable: bool) {
        assert_eq!(kind.is_retryable(), retryable);
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorKind::Status(404).to_string(), "unexpected HTTP status: 404");
    }
}
