//! Layered configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A TOML file: the one passed explicitly, or `dotgit.toml` in the
//!    platform config directory if it exists.
//! 3. `DOTGIT_`-prefixed environment variables (`DOTGIT_WORKERS=4`).
//!
//! Command-line flags are applied on top by the binary, after which
//! [`Config::validate`] must be called.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use dotgit_remote::{DEFAULT_USER_AGENT, FetchOptions};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "DOTGIT_";
pub const FILE_NAME: &str = "dotgit.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of concurrent download workers.
    pub workers: usize,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
    /// How long an idle worker waits on the queue before checking again.
    pub poll_interval_ms: u64,
    pub user_agent: String,
    pub accept_invalid_certs: bool,
    /// Scan recovered files for credentials.
    pub scan_secrets: bool,
    /// Destination root. Named after the target's host and port if unset.
    pub output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 10,
            timeout_secs: 10,
            poll_interval_ms: 500,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: true,
            scan_secrets: false,
            output: None,
        }
    }
}

impl Config {
    /// `<platform config dir>/dotgit.toml`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dotgit").map(|dirs| dirs.config_dir().join(FILE_NAME))
    }

    /// Every source except command-line flags, merged but not extracted.
    /// A file that doesn't exist contributes nothing.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file.filter(|file| file.is_file()) {
            figment = figment.merge(Toml::file_exact(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load from `file` if given (it must exist), otherwise from the default
    /// location (which may not). Does not validate.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let path = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path(),
        };
        let config: Self = Self::figment(path.as_deref()).extract().or_raise(|| ErrorKind::Load)?;
        tracing::debug!(path = ?path, ?config, "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            exn::bail!(ErrorKind::Invalid("workers must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("timeout_secs must be at least 1".to_string()));
        }
        if self.poll_interval_ms == 0 {
            exn::bail!(ErrorKind::Invalid("poll_interval_ms must be at least 1".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("user_agent must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout(),
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}
