//! Local filesystem storage backend.
//!
//! Files are written under a [`Destination`] using `tokio::fs` for async
//! I/O. Every path goes through the destination's guard first.

use crate::error::{ErrorKind, Result};
use crate::{Destination, StorageBackend};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use dotgit_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("local", "example.com_8080")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalBackend {
    name: String,
    destination: Destination,
}
impl LocalBackend {
    /// Create a new local filesystem backend, creating `root` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` exists but is not a directory, or cannot
    /// be created.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_destination(name, Destination::new(root)?))
    }

    pub fn with_destination(name: impl Into<String>, destination: Destination) -> Self {
        Self { name: name.into(), destination }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    fn absolute_path(&self, path: &Path) -> Result<PathBuf> {
        self.destination.resolve(path)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| ErrorKind::from_io(e, path))?)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| ErrorKind::from_io(e, path))?;
        }
        fs::write(&abs_path, data).await.map_err(|e| ErrorKind::from_io(e, path))?;
        tracing::trace!(backend = %self.name, path = %path.display(), size = data.len(), "Wrote file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("example.com_8080");
        let backend = LocalBackend::new("name", &root).unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.name(), "name");
    }

    #[test]
    fn test_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let expected = backend.destination().root().join("src/main.rs");
        assert_eq!(backend.absolute_path(Path::new("src/main.rs")).unwrap(), expected);
        // Path traversal is prevented
        assert!(backend.absolute_path(Path::new("../etc/passwd")).is_err());
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let data = b"Hello, world!";
        backend.write(Path::new("test.txt"), data).await.unwrap();
        let read_data = backend.read(Path::new("test.txt")).await.unwrap();
        assert_eq!(read_data, data);
    }

    #[tokio::test]
    async fn test_write_creates_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        backend.write(Path::new("a/b/c/file.txt"), b"data").await.unwrap();
        assert_eq!(backend.read(Path::new("a/b/c/file.txt")).await.unwrap(), b"data");
        assert!(temp_dir.path().join("a/b/c/file.txt").is_file());
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        backend.write(Path::new("dup.txt"), b"first, and longer").await.unwrap();
        backend.write(Path::new("dup.txt"), b"second").await.unwrap();
        assert_eq!(backend.read(Path::new("dup.txt")).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_write_outside_root_refused() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path().join("root")).unwrap();
        let err = backend.write(Path::new("../escaped.txt"), b"data").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
        assert!(!temp_dir.path().join("escaped.txt").exists());
    }

    #[tokio::test]
    async fn test_read_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let err = backend.read(Path::new("nonexistent.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }
}
