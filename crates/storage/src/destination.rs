use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use exn::ResultExt;
use std::fs::{canonicalize, create_dir_all as sync_create_dir};
use std::path::{Path, PathBuf};

/// The directory every recovered file is written under.
///
/// The root is created if needed and canonicalized once, on construction.
/// After that, every relative path is checked against it with
/// [`accept`](Self::accept) or turned into a write target with
/// [`resolve`](Self::resolve); neither touches the filesystem.
///
/// ```
/// # let tmp = tempfile::tempdir().unwrap();
/// use dotgit_storage::Destination;
///
/// let dest = Destination::new(tmp.path().join("example.com_8080")).unwrap();
/// assert!(dest.accept("src/main.rs"));
/// assert!(!dest.accept("../../.bashrc"));
/// assert!(!dest.accept("/etc/passwd"));
/// ```
#[derive(Debug, Clone)]
pub struct Destination {
    root: PathBuf,
}

impl Destination {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if root.exists() && !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root.to_path_buf()));
        }
        // Use non-async here; it only happens once per scan and it's not
        // worth making the constructor async.
        sync_create_dir(root).or_raise(|| ErrorKind::InvalidPath(root.to_path_buf()))?;
        let root = canonicalize(root).or_raise(|| ErrorKind::InvalidPath(root.to_path_buf()))?;
        tracing::debug!(root = %root.display(), "Destination ready");
        Ok(Self { root })
    }

    /// Canonical absolute root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute write target for `relative`, or
    /// [`InvalidPath`](ErrorKind::InvalidPath) if it would not be contained.
    ///
    /// Containment is decided lexically: symlinks already present under the
    /// root are not followed.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        let normalized = validate_path(relative.as_ref())?;
        let absolute = self.root.join(&normalized);
        if absolute == self.root || !absolute.starts_with(&self.root) {
            exn::bail!(ErrorKind::InvalidPath(relative.as_ref().to_path_buf()));
        }
        Ok(absolute)
    }

    /// The path safety guard: `true` if `relative` may be written.
    pub fn accept(&self, relative: impl AsRef<Path>) -> bool {
        self.resolve(relative).is_ok()
    }
}
