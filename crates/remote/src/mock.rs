//! In-memory fetcher for testing.

use crate::error::{ErrorKind, Result};
use crate::{Fetcher, Target};
use async_trait::async_trait;
use bytes::Bytes;
use dotgit_index::ObjectId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Serves canned bodies by exact URL. Anything not registered is a 404.
///
/// ```
/// use dotgit_remote::{Fetcher, MockFetcher, Target};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let target: Target = "http://example.com/.git/".parse().unwrap();
/// let fetcher = MockFetcher::default().with_index(&target, b"DIRC".to_vec());
/// let body = fetcher.fetch(&target.index_url().unwrap()).await.unwrap();
/// assert_eq!(&body[..], b"DIRC");
/// assert_eq!(fetcher.requests(), 1);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: HashMap<String, std::result::Result<Bytes, ErrorKind>>,
    requests: AtomicUsize,
}

impl MockFetcher {
    pub fn with_response(mut self, url: &Url, body: impl Into<Bytes>) -> Self {
        self.responses.insert(url.to_string(), Ok(body.into()));
        self
    }

    /// Make `url` fail with `kind` instead of answering.
    pub fn with_failure(mut self, url: &Url, kind: ErrorKind) -> Self {
        self.responses.insert(url.to_string(), Err(kind));
        self
    }

    /// Panics if the target can't produce an index URL; fix the fixture.
    pub fn with_index(self, target: &Target, body: impl Into<Bytes>) -> Self {
        let Ok(url) = target.index_url() else {
            panic!("MockFetcher::with_index: no index URL for {target}");
        };
        self.with_response(&url, body)
    }

    /// Register the raw (still compressed) bytes of an object.
    pub fn with_object(self, target: &Target, id: &ObjectId, raw: impl Into<Bytes>) -> Self {
        let Ok(url) = target.object_url(id) else {
            panic!("MockFetcher::with_object: no object URL for {id}");
        };
        self.with_response(&url, raw)
    }

    /// Number of fetches served so far, failures included.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(url.as_str()) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(kind)) => exn::bail!(kind.clone()),
            None => exn::bail!(ErrorKind::Status(404)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unregistered_is_not_found() {
        let fetcher = MockFetcher::default();
        let url = Url::parse("http://example.com/.git/index").unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Status(404));
        assert_eq!(fetcher.requests(), 1);
    }

    #[tokio::test]
    async fn test_failure() {
        let url = Url::parse("http://example.com/.git/index").unwrap();
        let fetcher = MockFetcher::default().with_failure(&url, ErrorKind::Timeout);
        assert_eq!(*fetcher.fetch(&url).await.unwrap_err(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_object() {
        let target: Target = "http://example.com/.git/".parse().unwrap();
        let id: ObjectId = "da39a3ee5e6b4b0d3255bfef95601890afd80709".parse().unwrap();
        let fetcher = MockFetcher::default().with_object(&target, &id, vec![1u8, 2, 3]);
        let url = Url::parse("http://example.com/.git/objects/da/39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        assert_eq!(&fetcher.fetch(&url).await.unwrap()[..], &[1, 2, 3]);
    }
}
