//! Configuration schema.
//!
//! All structs accept both `snake_case` and `camelCase` field names via
//! `#[serde(alias)]`, and every field has a default so an empty JSON
//! object (`{}`) is a complete configuration targeting English Wikipedia.
//! Unknown fields are ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration for revguard.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RevguardConfig {
    /// Which wiki is guarded and how its article URLs look.
    #[serde(default)]
    pub site: SiteConfig,

    /// How revision history is fetched.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Forward-proxy listener settings.
    #[serde(default)]
    pub proxy: ProxyConfig,
}

impl RevguardConfig {
    /// Check semantic constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.host.trim().is_empty() {
            return Err(ConfigError::invalid("site.host must not be empty"));
        }
        let prefix = &self.site.article_prefix;
        if prefix.len() < 2 || !prefix.starts_with('/') || !prefix.ends_with('/') {
            return Err(ConfigError::invalid(format!(
                "site.article_prefix must start and end with '/', got {prefix:?}"
            )));
        }
        if self.fetch.history_limit == 0 {
            return Err(ConfigError::invalid("fetch.history_limit must be at least 1"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::invalid("fetch.timeout_secs must be at least 1"));
        }
        if !self.fetch.export_path.starts_with('/') {
            return Err(ConfigError::invalid(format!(
                "fetch.export_path must start with '/', got {:?}",
                self.fetch.export_path
            )));
        }
        for (field, scheme) in [
            ("site.redirect_scheme", &self.site.redirect_scheme),
            ("fetch.scheme", &self.fetch.scheme),
        ] {
            if scheme != "http" && scheme != "https" {
                return Err(ConfigError::invalid(format!(
                    "{field} must be http or https, got {scheme:?}"
                )));
            }
        }
        Ok(())
    }
}

// ── Site ─────────────────────────────────────────────────────────────────

/// The wiki whose articles are inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Exact Host header value of guarded requests.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path prefix of article URLs, including both slashes.
    #[serde(default = "default_article_prefix", alias = "articlePrefix")]
    pub article_prefix: String,

    /// Scheme used in the redirect `Location`.
    #[serde(default = "default_scheme", alias = "redirectScheme")]
    pub redirect_scheme: String,
}

fn default_host() -> String {
    "en.wikipedia.org".into()
}
fn default_article_prefix() -> String {
    "/wiki/".into()
}
fn default_scheme() -> String {
    "http".into()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            article_prefix: default_article_prefix(),
            redirect_scheme: default_scheme(),
        }
    }
}

// ── Fetch ────────────────────────────────────────────────────────────────

/// Settings for the secondary history request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Path of the export script on the origin.
    #[serde(default = "default_export_path", alias = "exportPath")]
    pub export_path: String,

    /// Special page passed as `title`.
    #[serde(default = "default_export_page", alias = "exportPage")]
    pub export_page: String,

    /// Number of most recent revisions requested.
    #[serde(default = "default_history_limit", alias = "historyLimit")]
    pub history_limit: u32,

    /// Upper bound on the whole fetch exchange, in seconds.
    #[serde(default = "default_timeout_secs", alias = "timeoutSecs")]
    pub timeout_secs: u64,

    /// Scheme used to reach the origin.
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

fn default_export_path() -> String {
    "/w/index.php".into()
}
fn default_export_page() -> String {
    "Special:Export".into()
}
fn default_history_limit() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    10
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            export_path: default_export_path(),
            export_page: default_export_page(),
            history_limit: default_history_limit(),
            timeout_secs: default_timeout_secs(),
            scheme: default_scheme(),
        }
    }
}

// ── Proxy ────────────────────────────────────────────────────────────────

/// Forward-proxy host settings used by `revguard serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Socket address to listen on.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Fixed `host[:port]` to send all traffic to instead of the request's
    /// Host header. Useful behind a reverse proxy or in tests.
    #[serde(default)]
    pub upstream: Option<String>,

    /// Largest request body relayed upstream, in bytes.
    #[serde(default = "default_max_body_bytes", alias = "maxBodyBytes")]
    pub max_body_bytes: usize,

    /// Timeout for relaying the original request, in seconds.
    #[serde(default = "default_relay_timeout_secs", alias = "relayTimeoutSecs")]
    pub relay_timeout_secs: u64,
}

fn default_listen() -> String {
    "127.0.0.1:8080".into()
}
fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_relay_timeout_secs() -> u64 {
    60
}

impl ProxyConfig {
    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            upstream: None,
            max_body_bytes: default_max_body_bytes(),
            relay_timeout_secs: default_relay_timeout_secs(),
        }
    }
}
