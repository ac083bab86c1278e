use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

regex!(API_KEY_REGEX, r#"(api_key|api_secret|api_token|access_key)\s*[:=]\s*['"][a-zA-Z0-9]+['"]"#);
regex!(PASSWORD_REGEX, r#"(password|pass|pwd)\s*[:=]\s*['"][^'"]+['"]"#);
regex!(TOKEN_REGEX, r#"(token|auth_token|bearer)\s*[:=]\s*['"][a-zA-Z0-9_-]+['"]"#);
regex!(SSH_KEY_REGEX, r"-----BEGIN (RSA|DSA|EC|OPENSSH) PRIVATE KEY-----");
regex!(DATABASE_REGEX, r#"(db_host|db_user|db_pass|database_url)\s*[:=]\s*['"][^'"]+['"]"#);

/// Files with a NUL in this many leading bytes are treated as binary.
pub(crate) const BINARY_SNIFF_LEN: usize = 8000;
/// Characters kept visible at each end of a redacted match.
pub(crate) const REDACT_KEEP: usize = 4;
pub(crate) const REDACTED: &str = "****";
