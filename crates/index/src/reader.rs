//! Bounds-checked cursor over an in-memory index buffer.

use crate::error::{ErrorKind, Result};
use memchr::memchr;

/// A forward-only read cursor.
///
/// Every read either returns exactly the bytes asked for and advances, or
/// fails with [`Truncated`](ErrorKind::Truncated) and leaves the cursor where
/// it was. Multi-byte integers are big-endian, as they are on disk.
#[derive(Debug, Clone)]
pub struct IndexReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> IndexReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current cursor position, from the start of the buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left between the cursor and the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read a fixed-width field.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            exn::bail!(ErrorKind::Truncated { offset: self.offset, needed: len });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Discard `len` bytes without looking at them.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Read a NUL-terminated field. The terminator is left in place (it is
    /// part of the record padding, not the value).
    pub fn read_until_nul(&mut self) -> Result<&'a [u8]> {
        match memchr(0, &self.data[self.offset..]) {
            Some(len) => self.read_bytes(len),
            None => exn::bail!(ErrorKind::Truncated {
                offset: self.offset,
                needed: self.remaining() + 1,
            }),
        }
    }
}
