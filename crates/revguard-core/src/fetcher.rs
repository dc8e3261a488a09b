//! History fetcher.
//!
//! Issues the secondary request for an article's recent revisions. The
//! request goes to the same origin the client was talking to, with the
//! Host header forced to the guarded wiki so virtual hosting resolves to
//! the right site:
//!
//! ```text
//! POST /w/index.php?title=Special%3AExport&pages=Cat&offset=0&limit=5&action=submit&dir=desc
//! Host: en.wikipedia.org
//! Content-Length: 0
//! Accept: */*
//! ```
//!
//! `Special:Export` only returns a document for POST, hence the method.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use reqwest::header::{ACCEPT, CONTENT_LENGTH, HOST};
use tracing::{debug, warn};

use revguard_types::{FetchConfig, SiteConfig};

use crate::error::FetchError;

/// Source of raw history export documents.
///
/// The HTTP implementation is [`HttpHistoryFetcher`]; the trait exists so
/// the pipeline can be driven by canned documents.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch the history document for `article` from `origin` (`host[:port]`).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, timeout, or any
    /// non-200 status.
    async fn fetch(&self, article: &str, origin: &str) -> Result<String, FetchError>;
}

/// Fetches history over HTTP with [`reqwest`].
pub struct HttpHistoryFetcher {
    http: reqwest::Client,
    site_host: String,
    config: FetchConfig,
}

impl HttpHistoryFetcher {
    /// Fetcher with its own client. Redirects are never followed, so a 3xx
    /// from the export endpoint surfaces as [`FetchError::UpstreamStatus`].
    pub fn new(site: &SiteConfig, config: FetchConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self::with_client(http, site, config))
    }

    /// Use an existing client (shares its connection pool). The client must
    /// not follow redirects.
    pub fn with_client(http: reqwest::Client, site: &SiteConfig, config: FetchConfig) -> Self {
        Self {
            http,
            site_host: site.host.clone(),
            config,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// URL of the export request for `article` on `origin`.
    ///
    /// The article name arrives as it appeared in the request path, so it is
    /// percent-decoded before being encoded as a query value.
    pub fn export_url(&self, article: &str, origin: &str) -> String {
        let decoded = percent_decode_str(article).decode_utf8_lossy();
        format!(
            "{scheme}://{origin}{path}?title={title}&pages={pages}&offset=0&limit={limit}&action=submit&dir=desc",
            scheme = self.config.scheme,
            path = self.config.export_path,
            title = utf8_percent_encode(&self.config.export_page, NON_ALPHANUMERIC),
            pages = utf8_percent_encode(&decoded, NON_ALPHANUMERIC),
            limit = self.config.history_limit,
        )
    }

    fn classify_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl HistorySource for HttpHistoryFetcher {
    async fn fetch(&self, article: &str, origin: &str) -> Result<String, FetchError> {
        let url = self.export_url(article, origin);
        debug!(article = %article, origin = %origin, url = %url, "fetching revision history");

        let response = self
            .http
            .post(&url)
            .header(HOST, self.site_host.as_str())
            .header(CONTENT_LENGTH, "0")
            .header(ACCEPT, "*/*")
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let headers = format!("{:?}", response.headers());
            let body = drained_body(response.text().await);
            warn!(
                article = %article,
                status = status.as_u16(),
                headers = %headers,
                body = %body,
                "history request returned an error response"
            );
            return Err(FetchError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| self.classify_error(e))?;
        debug!(article = %article, bytes = body.len(), "revision history received");
        Ok(body)
    }
}

/// Error body text, or a placeholder naming why it could not be read.
fn drained_body<E: std::fmt::Display>(read: Result<String, E>) -> String {
    read.unwrap_or_else(|e| format!("<body unreadable: {e}>"))
}

impl std::fmt::Debug for HttpHistoryFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpHistoryFetcher")
            .field("site_host", &self.site_host)
            .field("export_path", &self.config.export_path)
            .field("history_limit", &self.config.history_limit)
            .field("timeout", &self.timeout())
            .finish()
    }
}
