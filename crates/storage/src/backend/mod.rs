//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! interface for the handful of file operations a scan needs: write the
//! reconstructed file, and read it back for anything downstream.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for storage backends.
///
/// # Path Handling
/// All paths are relative to the destination root and must pass
/// [`validate_path`](crate::validate_path) before use. Implementations
/// enforce this, so a path rejected by the guard can never be written even
/// if a caller forgets to check.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dotgit_storage::{backend::StorageBackend, error::Result};
///
/// async fn copy_readme(from: &dyn StorageBackend, to: &dyn StorageBackend) -> Result<()> {
///     let path = Path::new("README.md");
///     let data = from.read(path).await?;
///     to.write(path, &data).await
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// Read back a file written earlier.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write file contents.
    ///
    /// Creates a new file or overwrites an existing file with the provided
    /// data. Two writes to the same path: the later one wins.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed.
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use dotgit_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// backend.write(Path::new("src/main.rs"), b"fn main() {}\n").await?;
    /// # Ok(())
    /// # }
    /// ```
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;
}
