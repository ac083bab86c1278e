//! In-memory storage backend for testing.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Files are stored in a map behind a [`RwLock`], so all trait methods can
/// operate on `&self` without external synchronisation. Paths go through
/// the same validation as [`LocalBackend`](super::LocalBackend).
///
/// # Examples
///
/// ```
/// use dotgit_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([("README.md", b"# hello")]);
/// assert_eq!(backend.read(Path::new("README.md")).await?, b"# hello");
///
/// backend.write(Path::new("src/main.rs"), b"fn main() {}").await?;
/// assert_eq!(backend.snapshot().await.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = BTreeMap::new();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                // The panic here is DELIBERATE. MockBackend is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            map.insert(validated, data.into());
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
        }
    }

    /// Copy of everything written so far, ordered by path.
    pub async fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        self.storage.read().await.clone()
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let validated = validate_path(path)?;
        match self.storage.read().await.get(&validated) {
            Some(data) => Ok(data.clone()),
            None => exn::bail!(ErrorKind::NotFound(validated)),
        }
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let validated = validate_path(path)?;
        self.storage.write().await.insert(validated, data.to_vec());
        Ok(())
    }
}
