//! Path validation and security utilities.
//!
//! Paths handed to this module come straight out of a remote index file, so
//! they are treated as hostile: anything that could climb out of the
//! destination root is refused outright rather than resolved.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a relative storage path for security and correctness.
///
/// Unlike a general-purpose normalizer, a `..` component is rejected
/// wherever it appears, even when it would stay inside the root
/// (`a/b/..`). A legitimate index never contains one.
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dotgit_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("README.md").is_ok());
/// assert!(validate_path("src/lib/mod.rs").is_ok());
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../b").is_err());
/// assert!(validate_path("/etc/passwd").is_err());
/// assert!(validate_path("a\0b").is_err());
/// // Paths get tidied
/// assert_eq!(validate_path("./src//./main.rs").unwrap(), Path::new("src/main.rs"));
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(path.to_path_buf());
    // Use Rust's built-in path component parser for robust handling. Means we
    // don't have to deal with non-UTF8, or the maniacs on Unix that use
    // backslashes in their filenames.
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls, so reject them explicitly.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(invalid());
                }
                components.push(s)
            },
            Component::CurDir => {},
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => exn::bail!(invalid()),
        }
    }
    match components.is_empty() {
        true => exn::bail!(invalid()),
        false => Ok(components.into_iter().collect()),
    }
}
