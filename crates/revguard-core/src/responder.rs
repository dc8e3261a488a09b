//! Redirect responder.
//!
//! Builds the `302 Found` sent to the client when an older revision was
//! chosen, and writes it through the host's [`ResponseWriter`].

use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::info;

use revguard_types::SiteConfig;

use crate::error::WriteError;

/// A fully formed HTTP response ready to be written to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponse {
    /// HTTP status code.
    pub status: u16,
    /// Header name/value pairs, in write order.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: String,
}

impl RedirectResponse {
    /// First header with this name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn location(&self) -> Option<&str> {
        self.header("Location")
    }
}

/// Host-side handle through which the core writes its single response.
#[async_trait]
pub trait ResponseWriter: Send {
    /// Write `response` to the client. Called at most once per request.
    async fn write_response(&mut self, response: RedirectResponse) -> Result<(), WriteError>;
}

/// A [`ResponseWriter`] that keeps the response in memory for the host to
/// send later (used by the proxy host and in tests).
#[derive(Debug, Default)]
pub struct ResponseSlot {
    response: Option<RedirectResponse>,
}

impl ResponseSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_written(&self) -> bool {
        self.response.is_some()
    }

    pub fn take(&mut self) -> Option<RedirectResponse> {
        self.response.take()
    }
}

#[async_trait]
impl ResponseWriter for ResponseSlot {
    async fn write_response(&mut self, response: RedirectResponse) -> Result<(), WriteError> {
        if self.response.is_some() {
            return Err(WriteError::AlreadyWritten);
        }
        self.response = Some(response);
        Ok(())
    }
}

/// Builds redirect responses for one site.
#[derive(Debug, Clone)]
pub struct RedirectResponder {
    article_base: String,
}

impl RedirectResponder {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            article_base: format!(
                "{}://{}{}",
                site.redirect_scheme, site.host, site.article_prefix
            ),
        }
    }

    /// Canonical URL of `article` pinned to `revision`.
    pub fn target_url(&self, article: &str, revision: &str) -> String {
        format!(
            "{}{}?oldid={}",
            self.article_base,
            article,
            utf8_percent_encode(revision, NON_ALPHANUMERIC)
        )
    }

    /// Build the redirect without writing it.
    pub fn build(&self, article: &str, revision: &str) -> RedirectResponse {
        let target = self.target_url(article, revision);
        let body = render_body(article, &target);
        RedirectResponse {
            status: 302,
            headers: vec![
                ("Location".into(), target),
                ("Content-Type".into(), "text/html".into()),
                ("Content-Length".into(), body.len().to_string()),
            ],
            body,
        }
    }

    /// Build the redirect and write it through `writer`.
    pub async fn respond(
        &self,
        writer: &mut dyn ResponseWriter,
        article: &str,
        revision: &str,
    ) -> Result<(), WriteError> {
        let response = self.build(article, revision);
        info!(
            article = %article,
            revision = %revision,
            location = response.location().unwrap_or_default(),
            "redirecting to registered-user revision"
        );
        writer.write_response(response).await
    }
}

fn render_body(article: &str, target: &str) -> String {
    let page = escape_html(article);
    let target = escape_html(target);
    format!(
        "<html><head><title>Redirecting {page}</title></head>\n\
         <body>\n\
         \x20 <h1>Redirecting to a human-edited version</h1>\n\
         \x20 <p>The last version of {page} was edited by an anonymous user.</p>\n\
         \x20 <p>Redirecting to the last human-edited version:\n\
         \x20    <a href=\"{target}\">{target}</a></p>\n\
         </body></html>\n"
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responder() -> RedirectResponder {
        RedirectResponder::new(&SiteConfig::default())
    }

    #[test]
    fn target_url_format() {
        assert_eq!(
            responder().target_url("Cat", "102"),
            "http://en.wikipedia.org/wiki/Cat?oldid=102"
        );
    }

    #[test]
    fn target_url_honors_site_config() {
        let site = SiteConfig {
            host: "wiki.example.org".into(),
            article_prefix: "/page/".into(),
            redirect_scheme: "https".into(),
        };
        let responder = RedirectResponder::new(&site);
        assert_eq!(
            responder.target_url("Dog", "7"),
            "https://wiki.example.org/page/Dog?oldid=7"
        );
    }

    #[test]
    fn build_sets_status_and_headers() {
        let resp = responder().build("Cat", "102");
        assert_eq!(resp.status, 302);
        assert_eq!(
            resp.location(),
            Some("http://en.wikipedia.org/wiki/Cat?oldid=102")
        );
        assert_eq!(resp.header("content-type"), Some("text/html"));
        assert_eq!(
            resp.header("Content-Length"),
            Some(resp.body.len().to_string().as_str())
        );
    }

    #[test]
    fn body_links_to_location() {
        let resp = responder().build("Cat", "102");
        let href = "<a href=\"http://en.wikipedia.org/wiki/Cat?oldid=102\">";
        assert!(resp.body.contains(href));
        assert!(resp.body.contains("<title>Redirecting Cat</title>"));
        assert!(resp.body.contains("edited by an anonymous user"));
        assert!(resp.body.ends_with("</body></html>\n"));
    }

    #[test]
    fn content_length_counts_bytes() {
        let resp = responder().build("Caf\u{e9}", "1");
        let declared: usize = resp.header("Content-Length").unwrap().parse().unwrap();
        assert_eq!(declared, resp.body.len());
        assert!(declared > resp.body.chars().count());
    }

    #[test]
    fn body_escapes_markup() {
        let resp = responder().build("<b>", "1");
        assert!(resp.body.contains("Redirecting &lt;b&gt;"));
        assert!(!resp.body.contains("<b>"));
    }

    #[test]
    fn revision_is_query_encoded() {
        assert!(responder().target_url("Cat", "1 2").ends_with("oldid=1%202"));
    }

    #[tokio::test]
    async fn respond_writes_once() {
        let mut slot = ResponseSlot::new();
        responder().respond(&mut slot, "Cat", "102").await.unwrap();
        assert!(slot.is_written());

        let err = responder()
            .respond(&mut slot, "Cat", "101")
            .await
            .unwrap_err();
        assert!(matches!(err, WriteError::AlreadyWritten));

        let resp = slot.take().unwrap();
        assert!(resp.location().unwrap().ends_with("oldid=102"));
    }
}
