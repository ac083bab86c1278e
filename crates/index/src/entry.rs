use crate::error::{Error, ErrorKind, Result};
use crate::reader::IndexReader;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// ctime, mtime (seconds + nanoseconds each), dev, ino, mode, uid, gid and
/// size: ten 32-bit fields that recovery has no use for.
pub(crate) const METADATA_LEN: usize = 40;
/// Lower 12 bits of the flags word hold the name length.
pub(crate) const NAME_MASK: u16 = 0x0FFF;
/// Set on version 3+ entries that carry a second (extended) flags word.
pub(crate) const EXTENDED_FLAG: u16 = 0x4000;

/// Raw 20-byte content hash of an object.
///
/// Displays as 40 lower-case hex digits, which is also how objects are
/// addressed on the remote end.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; ObjectId::LEN]);

impl ObjectId {
    pub const LEN: usize = 20;

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Split the hex form into the fan-out directory (first two digits) and
    /// the object's file name (remaining 38).
    ///
    /// ```
    /// use dotgit_index::ObjectId;
    ///
    /// let id: ObjectId = "da39a3ee5e6b4b0d3255bfef95601890afd80709".parse().unwrap();
    /// let (dir, file) = id.fanout();
    /// assert_eq!(dir, "da");
    /// assert_eq!(file, "39a3ee5e6b4b0d3255bfef95601890afd80709");
    /// ```
    pub fn fanout(&self) -> (String, String) {
        let mut hex = self.to_string();
        let file = hex.split_off(2);
        (hex, file)
    }
}

impl From<[u8; ObjectId::LEN]> for ObjectId {
    fn from(bytes: [u8; ObjectId::LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for ObjectId {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut bytes = [0u8; Self::LEN];
        match hex::decode_to_slice(s, &mut bytes) {
            Ok(()) => Ok(Self(bytes)),
            Err(_) => exn::bail!(ErrorKind::InvalidObjectId(s.to_string())),
        }
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&hex::encode(self.0))
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "ObjectId({self})")
    }
}

/// One tracked file from the index: which object holds its content and
/// where it lives relative to the work tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: ObjectId,
    /// Decoded best-effort; invalid UTF-8 is replaced with U+FFFD.
    pub path: String,
}

/// Lazy, single-pass iterator over the entries of an [`Index`](crate::Index).
///
/// Yields `Ok` entries in file order. The first error (always a
/// [`Truncated`](ErrorKind::Truncated)) is yielded once, after which the
/// iterator is exhausted. Entries yielded before the error stay valid.
#[derive(Debug)]
pub struct Entries<'a> {
    reader: IndexReader<'a>,
    version: u32,
    remaining: u32,
    failed: bool,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(reader: IndexReader<'a>, version: u32, count: u32) -> Self {
        Self { reader, version, remaining: count, failed: false }
    }

    /// Number of entries the header promised that haven't been read yet.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    fn read_entry(&mut self, last: bool) -> Result<IndexEntry> {
        let start = self.reader.offset();
        self.reader.skip(METADATA_LEN)?;
        let id = ObjectId::from(self.reader.read_array::<{ ObjectId::LEN }>()?);
        let flags = self.reader.read_u16()?;
        if self.version >= 3 && flags & EXTENDED_FLAG != 0 {
            self.reader.skip(2)?;
        }
        let name = match flags & NAME_MASK {
            // Names this long don't fit in the flags, so the length saturates
            // and the terminator is the only way to find the end.
            NAME_MASK => self.reader.read_until_nul()?,
            len => self.reader.read_bytes(usize::from(len))?,
        };
        let path = String::from_utf8_lossy(name).into_owned();

        // Records are NUL-padded to the next multiple of 8, with at least one
        // NUL, so a name ending exactly on a boundary gets a full 8 bytes.
        // This is git's `(62 + len + 8) & ~7` record size; a writer that pads
        // an already aligned record with nothing is not producing git's layout.
        let consumed = self.reader.offset() - start;
        let padding = ((consumed + 8) & !7) - consumed;
        if last {
            // Trailing padding of the final record is allowed to be cut off.
            self.reader.skip(padding.min(self.reader.remaining()))?;
        } else {
            self.reader.skip(padding)?;
        }
        tracing::trace!(%id, path = %path, offset = start, "Decoded index entry");
        Ok(IndexEntry { id, path })
    }
}

impl Iterator for Entries<'_> {
    type Item = Result<IndexEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let entry = self.read_entry(self.remaining == 0);
        if entry.is_err() {
            self.failed = true;
            self.remaining = 0;
        }
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // The header count is an upper bound; truncation can cut it short.
        (0, usize::try_from(self.remaining).ok())
    }
}

impl std::iter::FusedIterator for Entries<'_> {}
