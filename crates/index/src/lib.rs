//! Decoder for the binary index (`.git/index`, "DIRC") format.
//!
//! Only what's needed to rebuild a work tree is kept: each entry's object id
//! and path. Everything else in the per-entry metadata block (timestamps,
//! device/inode, mode, ownership, size) is skipped by fixed offset.
//!
//! ```text
//! header   "DIRC" | version: u32 | count: u32
//! entry    40 bytes metadata | id: [u8; 20] | flags: u16
//!          [extended flags: u16, version 3+ only]
//!          name: flags & 0x0FFF bytes | 1..=8 NUL bytes to 8-byte alignment
//! ```
//!
//! Decoding is pure: no I/O, no allocation beyond the decoded paths.

mod entry;
pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
mod reader;

pub use crate::entry::{Entries, IndexEntry, ObjectId};
use crate::error::{ErrorKind, Result};
pub use crate::reader::IndexReader;
use tracing::instrument;

pub const SIGNATURE: &[u8; 4] = b"DIRC";
pub const SUPPORTED_VERSIONS: [u32; 2] = [2, 3];

/// A parsed index header plus a cursor positioned at the first entry.
///
/// The header is validated eagerly in [`parse`](Self::parse), so signature
/// and version problems surface before a single entry is produced. Entries
/// are decoded lazily by iterating; the iterator can only be walked once.
///
/// ```
/// use dotgit_index::Index;
///
/// let bytes = b"DIRC\x00\x00\x00\x02\x00\x00\x00\x00";
/// let index = Index::parse(bytes).unwrap();
/// assert_eq!(index.version(), 2);
/// assert!(index.is_empty());
/// assert_eq!(index.entries().count(), 0);
/// ```
#[derive(Debug)]
pub struct Index<'a> {
    version: u32,
    count: u32,
    body: IndexReader<'a>,
}

impl<'a> Index<'a> {
    #[instrument(skip(data), fields(size = data.len()))]
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut body = IndexReader::new(data);
        if body.read_bytes(SIGNATURE.len())? != SIGNATURE {
            exn::bail!(ErrorKind::Signature);
        }
        let version = body.read_u32()?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            exn::bail!(ErrorKind::UnsupportedVersion(version));
        }
        let count = body.read_u32()?;
        tracing::debug!(version, count, "Parsed index header");
        Ok(Self { version, count, body })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of entries declared in the header. A truncated file will
    /// yield fewer.
    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn entries(self) -> Entries<'a> {
        Entries::new(self.body, self.version, self.count)
    }
}

impl<'a> IntoIterator for Index<'a> {
    type Item = Result<IndexEntry>;
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}
