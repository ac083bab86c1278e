use crate::error::{ErrorKind, Result};
use memchr::memchr;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Longest type token we'll look for. The real ones top out at six bytes
/// ("commit"); anything much longer is content, not a header.
const MAX_KIND_LEN: usize = 16;
/// u64::MAX has 20 decimal digits.
const MAX_SIZE_DIGITS: usize = 20;

/// The type token of a loose object header.
///
/// Nothing downstream treats the types differently: trees and commits are
/// written out verbatim like blobs. The kind is kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
    Tag,
    Other(String),
}

impl ObjectKind {
    fn from_token(token: &[u8]) -> Self {
        match token {
            b"blob" => Self::Blob,
            b"tree" => Self::Tree,
            b"commit" => Self::Commit,
            b"tag" => Self::Tag,
            other => Self::Other(String::from_utf8_lossy(other).into_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
            Self::Other(s) => s,
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A `"<type> <decimal-size>\0"` prefix found at the very start of an
/// inflated object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseHeader {
    pub kind: ObjectKind,
    /// Content size the header declares.
    pub size: u64,
    /// Header length in bytes, including the NUL terminator.
    pub len: usize,
}

impl LooseHeader {
    /// Look for a header at offset 0 of `data`, and only there.
    ///
    /// Returns `Ok(None)` when the buffer doesn't start with something shaped
    /// like a header; that isn't an error, the content is just used as-is.
    /// A header-shaped prefix whose size doesn't fit in a `u64` is an error.
    ///
    /// ```
    /// use dotgit_object::{LooseHeader, ObjectKind};
    ///
    /// let header = LooseHeader::parse(b"blob 5\0hello").unwrap().unwrap();
    /// assert_eq!(header.kind, ObjectKind::Blob);
    /// assert_eq!(header.size, 5);
    /// assert_eq!(header.len, 7);
    /// assert!(LooseHeader::parse(b"hello").unwrap().is_none());
    /// ```
    pub fn parse(data: &[u8]) -> Result<Option<Self>> {
        let window = &data[..data.len().min(MAX_KIND_LEN + 1 + MAX_SIZE_DIGITS + 1)];
        let Some(space) = memchr(b' ', window) else {
            return Ok(None);
        };
        let token = &window[..space];
        if token.is_empty() || token.len() > MAX_KIND_LEN || !token.iter().all(u8::is_ascii_lowercase) {
            return Ok(None);
        }
        let rest = &window[space + 1..];
        let Some(nul) = memchr(0, rest) else {
            return Ok(None);
        };
        let digits = &rest[..nul];
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Ok(None);
        }
        // All ASCII digits, so this is valid UTF-8; only overflow can fail.
        let digits = String::from_utf8_lossy(digits);
        let Ok(size) = digits.parse::<u64>() else {
            exn::bail!(ErrorKind::Header(format!("{} {digits}", String::from_utf8_lossy(token))));
        };
        Ok(Some(Self {
            kind: ObjectKind::from_token(token),
            size,
            len: space + 1 + nul + 1,
        }))
    }
}
