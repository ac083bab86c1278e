//! Getting bytes off the remote end.
//!
//! A scan needs exactly one operation from the network: fetch the whole body
//! at a URL, or fail. [`Fetcher`] is that seam; [`HttpFetcher`] is the real
//! thing and `MockFetcher` (feature `mock`) serves canned responses to tests.
//! There are no retries at this layer or any other.

pub mod error;
mod http;
#[cfg(feature = "mock")]
mod mock;
mod target;

use crate::error::Result;
pub use crate::http::{DEFAULT_USER_AGENT, FetchOptions, HttpFetcher};
#[cfg(feature = "mock")]
pub use crate::mock::MockFetcher;
pub use crate::target::Target;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
pub use url::Url;

pub type FetcherHandle = Arc<dyn Fetcher>;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download the complete body at `url`. Anything but a 2xx response is
    /// an error.
    async fn fetch(&self, url: &Url) -> Result<Bytes>;
}
