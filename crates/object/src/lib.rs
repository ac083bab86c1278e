//! Turn the raw bytes of a loose object back into the file they came from.
//!
//! A loose object is a zlib stream whose inflated form starts with a short
//! ASCII header, `"<type> <size>\0"`. Reconstruction is:
//!
//! 1. [`inflate`] the raw bytes, then
//! 2. strip the header at offset 0, if there is one ([`LooseHeader::parse`]).
//!
//! Exactly one header is removed, and only from the very start. Anything in
//! the content that happens to look like a header is left alone.

pub mod error;
mod header;
#[cfg(feature = "mock")]
pub mod mock;
mod ops;

use crate::error::Result;
pub use crate::header::{LooseHeader, ObjectKind};
pub use crate::ops::inflate;
use tracing::instrument;

/// An inflated object with its header (if any) split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseObject {
    pub header: Option<LooseHeader>,
    pub content: Vec<u8>,
}

impl LooseObject {
    #[instrument(skip(raw), fields(raw_size = raw.len()))]
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let mut content = inflate(raw)?;
        let header = LooseHeader::parse(&content)?;
        if let Some(header) = &header {
            content.drain(..header.len);
            if header.size != content.len() as u64 {
                // Written out anyway; a short file beats no file.
                tracing::warn!(
                    kind = %header.kind,
                    declared = header.size,
                    actual = content.len(),
                    "Object size does not match its header"
                );
            }
        }
        Ok(Self { header, content })
    }
}

/// Inflate `raw` and strip its loose-object header, returning the original
/// file content.
///
/// Deterministic: the same input always reconstructs to the same bytes.
pub fn reconstruct(raw: &[u8]) -> Result<Vec<u8>> {
    LooseObject::decode(raw).map(|object| object.content)
}
