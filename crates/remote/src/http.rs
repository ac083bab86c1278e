use crate::Fetcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use bytes::Bytes;
use exn::ResultExt;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::instrument;
use url::Url;

/// What a desktop browser sends. Some servers only expose `.git/` to
/// clients that look like one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/99.0.4844.82 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    /// Per request, covering connect through to the last body byte.
    pub timeout: Duration,
    /// Exposed repositories frequently sit behind self-signed or expired
    /// certificates, so verification is off unless asked for.
    pub accept_invalid_certs: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            accept_invalid_certs: true,
        }
    }
}

/// [`Fetcher`] backed by a single shared `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&options.user_agent).or_raise(|| ErrorKind::Client)?;
        headers.insert(USER_AGENT, user_agent);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        if options.accept_invalid_certs {
            tracing::debug!("TLS certificate verification disabled");
        }
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url, status, size))]
    async fn fetch(&self, url: &Url) -> Result<Bytes> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(e).or_raise(|| ErrorKind::Timeout),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Request),
        };
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => return Err(e).or_raise(|| ErrorKind::Timeout),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Request),
        };
        tracing::Span::current().record("size", body.len());
        tracing::trace!("Fetched");
        Ok(body)
    }
}
