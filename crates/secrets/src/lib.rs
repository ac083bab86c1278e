//! Credential scanning for recovered files.
//!
//! Runs after a file has been written, over its reconstructed content. The
//! patterns look for the usual suspects (API keys, passwords, tokens,
//! private key headers, database connection settings) and every match is
//! redacted before it leaves this crate.

mod consts;

use crate::consts::{
    API_KEY_REGEX, BINARY_SNIFF_LEN, DATABASE_REGEX, PASSWORD_REGEX, REDACT_KEEP, REDACTED, SSH_KEY_REGEX,
    TOKEN_REGEX,
};
use derive_more::Display;
use memchr::memchr;
use regex::Regex;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[display("api_key")]
    ApiKey,
    #[display("password")]
    Password,
    #[display("token")]
    Token,
    #[display("ssh_key")]
    SshKey,
    #[display("database")]
    Database,
}

impl Category {
    pub const ALL: [Self; 5] = [Self::ApiKey, Self::Password, Self::Token, Self::SshKey, Self::Database];

    fn regex(&self) -> &'static Regex {
        match self {
            Self::ApiKey => &API_KEY_REGEX,
            Self::Password => &PASSWORD_REGEX,
            Self::Token => &TOKEN_REGEX,
            Self::SshKey => &SSH_KEY_REGEX,
            Self::Database => &DATABASE_REGEX,
        }
    }
}

/// One match. The raw text is never kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub category: Category,
    pub redacted: String,
}

/// Scan `content` for credential-looking text.
///
/// Findings are grouped by category, in the order of [`Category::ALL`], and
/// in order of appearance within a category. Binary content yields nothing.
///
/// ```
/// use dotgit_secrets::{scan, Category};
///
/// let findings = scan(b"DATABASE_URL=x\ndatabase_url = 'postgres://app@db/app'\n");
/// assert_eq!(findings.len(), 1);
/// assert_eq!(findings[0].category, Category::Database);
/// assert_eq!(findings[0].redacted, "data****app'");
/// ```
pub fn scan(content: &[u8]) -> Vec<Finding> {
    if is_binary(content) {
        return Vec::new();
    }
    let text = String::from_utf8_lossy(content);
    let mut findings = Vec::new();
    for category in Category::ALL {
        for found in category.regex().find_iter(&text) {
            findings.push(Finding { category, redacted: redact(found.as_str()) });
        }
    }
    tracing::trace!(size = content.len(), findings = findings.len(), "Scanned content");
    findings
}

/// Keep the first and last four characters; hide the rest. Anything too
/// short to hide something between the two ends is hidden entirely.
///
/// ```
/// use dotgit_secrets::redact;
///
/// assert_eq!(redact("password: 'hunter2'"), "pass****er2'");
/// assert_eq!(redact("short"), "****");
/// ```
pub fn redact(matched: &str) -> String {
    let chars: Vec<char> = matched.chars().collect();
    if chars.len() <= REDACT_KEEP * 2 {
        return REDACTED.to_string();
    }
    let head: String = chars[..REDACT_KEEP].iter().collect();
    let tail: String = chars[chars.len() - REDACT_KEEP..].iter().collect();
    format!("{head}{REDACTED}{tail}")
}

fn is_binary(content: &[u8]) -> bool {
    memchr(0, &content[..content.len().min(BINARY_SNIFF_LEN)]).is_some()
}
