//! Plain-HTTP forward proxy hosting the revision pipeline.
//!
//! Every request is handed to [`RevisionPipeline::intercept`]. If the
//! pipeline wrote a redirect, that response goes back to the client;
//! otherwise the original request is relayed upstream unchanged and the
//! upstream response is streamed back.
//!
//! ```text
//! client --GET http://en.wikipedia.org/wiki/Cat--> proxy
//!          proxy --POST /w/index.php?title=Special:Export...--> origin
//!          proxy <--302 Location: ...?oldid=N-- (anonymous newest)
//!          proxy --GET /wiki/Cat--> origin      (everything else)
//! ```
//!
//! `CONNECT` tunnels are not supported; HTTPS traffic cannot be inspected.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use revguard_core::{
    HttpHistoryFetcher, InterceptedRequest, RedirectResponse, ResponseSlot, RevisionPipeline,
};
use revguard_types::RevguardConfig;

/// Headers that describe a single hop and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Shared state for all proxy connections.
#[derive(Clone)]
pub struct ProxyState {
    pipeline: Arc<RevisionPipeline>,
    http: reqwest::Client,
    upstream: Option<String>,
    max_body_bytes: usize,
    relay_timeout: Duration,
}

impl ProxyState {
    /// Build the proxy state. The history fetcher and the relay share one
    /// connection pool; neither follows redirects.
    pub fn new(config: &RevguardConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;
        let fetcher =
            HttpHistoryFetcher::with_client(http.clone(), &config.site, config.fetch.clone());
        Ok(Self {
            pipeline: Arc::new(RevisionPipeline::with_source(
                &config.site,
                Arc::new(fetcher),
            )),
            http,
            upstream: config.proxy.upstream.clone(),
            max_body_bytes: config.proxy.max_body_bytes,
            relay_timeout: config.proxy.relay_timeout(),
        })
    }
}

/// Build the proxy router. Every path goes to the same handler.
pub fn build_router(state: ProxyState) -> Router {
    Router::new()
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn proxy_handler(State(state): State<ProxyState>, req: Request) -> Response {
    if req.method() == Method::CONNECT {
        return (
            StatusCode::NOT_IMPLEMENTED,
            "CONNECT tunneling is not supported",
        )
            .into_response();
    }

    let Some(host) = request_host(&req) else {
        return (StatusCode::BAD_REQUEST, "missing Host header").into_response();
    };
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".into());
    let origin = state.upstream.clone().unwrap_or_else(|| host.clone());
    let intercepted = InterceptedRequest::new(host, path, origin);

    let mut slot = ResponseSlot::new();
    let proceed = state
        .pipeline
        .intercept(&intercepted, &mut slot, |outcome| {
            debug!(
                host = %intercepted.host,
                path = %intercepted.path,
                outcome = %outcome,
                "inspection finished"
            );
            outcome.passes_through()
        })
        .await;

    if !proceed && let Some(redirect) = slot.take() {
        return redirect_response(redirect);
    }
    relay(&state, &intercepted, req).await
}

/// Host header, falling back to the authority of an absolute-form URI.
fn request_host(req: &Request) -> Option<String> {
    req.headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .or_else(|| req.uri().authority().map(|a| a.to_string()))
}

/// Convert the pipeline's redirect into an axum response.
fn redirect_response(redirect: RedirectResponse) -> Response {
    let status = StatusCode::from_u16(redirect.status).unwrap_or(StatusCode::FOUND);
    let mut response = (status, redirect.body).into_response();
    for (name, value) in redirect.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!(header = %name, "dropping unrepresentable redirect header"),
        }
    }
    response
}

/// Forward the original request to its origin and stream the answer back.
///
/// `relay_timeout` bounds the wait for the upstream status line and headers
/// only; the body is streamed for as long as the origin keeps sending it.
async fn relay(state: &ProxyState, target: &InterceptedRequest, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let body = match read_body(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(BodyError::TooLarge) => {
            warn!(path = %target.path, limit = state.max_body_bytes, "request body too large");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
        Err(BodyError::Read(e)) => {
            warn!(path = %target.path, error = %e, "failed to read request body");
            return (StatusCode::BAD_REQUEST, "failed to read request body").into_response();
        }
    };

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::CONTENT_LENGTH);

    let url = format!("http://{}{}", target.origin, target.path);
    let send = state
        .http
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send();

    let resp = match tokio::time::timeout(state.relay_timeout, send).await {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            warn!(url = %url, error = %e, "upstream request failed");
            return (StatusCode::BAD_GATEWAY, "upstream request failed").into_response();
        }
        Err(_) => {
            warn!(
                url = %url,
                timeout_secs = state.relay_timeout.as_secs(),
                "upstream did not answer in time"
            );
            return (StatusCode::BAD_GATEWAY, "upstream request timed out").into_response();
        }
    };

    let status = resp.status();
    let mut headers = resp.headers().clone();
    strip_hop_by_hop(&mut headers);
    let mut response = Response::new(Body::from_stream(resp.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[derive(Debug)]
enum BodyError {
    TooLarge,
    Read(axum::Error),
}

/// Buffer a request body, refusing anything over `limit` bytes.
async fn read_body(body: Body, limit: usize) -> Result<Bytes, BodyError> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(BodyError::Read)?;
        if buf.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

/// Remove hop-by-hop headers, including any named in `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    for name in HOP_BY_HOP.iter().copied().chain(listed.iter().map(String::as_str)) {
        headers.remove(name);
    }
}
