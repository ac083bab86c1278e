//! Loose object encoder for building test fixtures.

use flate2::{Compression, write::ZlibEncoder};
use std::io::Write;

/// Zlib-compress `data` as-is, with no header added.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing into a Vec can't fail.
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}

/// Encode `content` the way it is stored on the remote end: header, then
/// content, zlib-compressed.
///
/// ```
/// use dotgit_object::{mock::loose_object, reconstruct};
///
/// let raw = loose_object("blob", b"hello");
/// assert_eq!(reconstruct(&raw).unwrap(), b"hello");
/// ```
pub fn loose_object(kind: &str, content: &[u8]) -> Vec<u8> {
    let mut inflated = format!("{kind} {}\0", content.len()).into_bytes();
    inflated.extend_from_slice(content);
    deflate(&inflated)
}
