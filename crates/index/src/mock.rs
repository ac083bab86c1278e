//! Index encoder for building test fixtures.

use crate::{ObjectId, SIGNATURE};

/// Builds index bytes in the on-disk layout [`Index::parse`](crate::Index::parse)
/// understands. Metadata blocks are zeroed and no checksum trailer is written.
///
/// Panics on malformed hex. It's for test setup; a broken fixture should not
/// quietly turn into a passing test.
///
/// ```
/// use dotgit_index::{Index, mock::IndexBuilder};
///
/// let bytes = IndexBuilder::new(2)
///     .entry("da39a3ee5e6b4b0d3255bfef95601890afd80709", "README.md")
///     .build();
/// let entries: Vec<_> = Index::parse(&bytes).unwrap().entries().collect();
/// assert_eq!(entries.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    version: u32,
    entries: Vec<(ObjectId, Vec<u8>)>,
}

impl IndexBuilder {
    pub fn new(version: u32) -> Self {
        Self { version, entries: Vec::new() }
    }

    pub fn entry(mut self, hash: &str, path: impl AsRef<[u8]>) -> Self {
        let Ok(id) = hash.parse::<ObjectId>() else {
            panic!("IndexBuilder::entry: invalid object id {hash}");
        };
        self.entries.push((id, path.as_ref().to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(SIGNATURE);
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        for (id, name) in &self.entries {
            let start = out.len();
            out.extend_from_slice(&[0u8; 40]);
            out.extend_from_slice(id.as_bytes());
            out.extend_from_slice(&(name.len().min(0x0FFF) as u16).to_be_bytes());
            out.extend_from_slice(name);
            let consumed = out.len() - start;
            out.resize(start + ((consumed + 8) & !7), 0);
        }
        out
    }
}
