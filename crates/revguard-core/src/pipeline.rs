//! Pipeline orchestrator.
//!
//! Runs the inspection stages strictly in order for one intercepted
//! request:
//!
//! ```text
//! Filtering -> Fetching -> Parsing -> Deciding -> Responding | pass-through
//! ```
//!
//! Every failure is absorbed here and turned into a pass-through outcome.
//! The client never sees an inspection error; at worst no redirect happens.

use std::sync::Arc;

use tracing::{debug, info, warn};

use revguard_types::{
    Decision, Diagnostic, Eligibility, PipelineOutcome, RevguardConfig, RevisionRecord,
    SiteConfig, SkipReason, Stage,
};

use crate::decision::decide;
use crate::eligibility::EligibilityFilter;
use crate::error::FetchError;
use crate::fetcher::{HistorySource, HttpHistoryFetcher};
use crate::parser::parse_history;
use crate::responder::{RedirectResponder, ResponseWriter};

/// What the host hands the core for each request. Read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    /// Host header as sent by the client.
    pub host: String,
    /// Request path including any query string.
    pub path: String,
    /// `host[:port]` of the endpoint the request is addressed to; the
    /// history fetch goes there too.
    pub origin: String,
}

impl InterceptedRequest {
    pub fn new(
        host: impl Into<String>,
        path: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            origin: origin.into(),
        }
    }
}

/// Result of fetching, parsing and deciding for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// Revisions newest-first, as returned by the origin.
    pub revisions: Vec<RevisionRecord>,
    pub decision: Decision,
}

/// The revision-inspection pipeline. Holds no per-request state, so one
/// instance is shared (behind an `Arc`) across all concurrent requests.
pub struct RevisionPipeline {
    filter: EligibilityFilter,
    source: Arc<dyn HistorySource>,
    responder: RedirectResponder,
}

impl RevisionPipeline {
    /// Pipeline fetching history over HTTP according to `config`.
    pub fn new(config: &RevguardConfig) -> Result<Self, FetchError> {
        let source = HttpHistoryFetcher::new(&config.site, config.fetch.clone())?;
        Ok(Self::with_source(&config.site, Arc::new(source)))
    }

    /// Pipeline reading history from an arbitrary source.
    pub fn with_source(site: &SiteConfig, source: Arc<dyn HistorySource>) -> Self {
        Self {
            filter: EligibilityFilter::new(site),
            source,
            responder: RedirectResponder::new(site),
        }
    }

    /// Run the pipeline and hand the outcome to `next`, the host's continue
    /// signal. `next` is consumed, so it runs exactly once whatever happens.
    pub async fn intercept<F, R>(
        &self,
        request: &InterceptedRequest,
        writer: &mut dyn ResponseWriter,
        next: F,
    ) -> R
    where
        F: FnOnce(PipelineOutcome) -> R,
    {
        let outcome = self.run(request, writer).await;
        next(outcome)
    }

    /// Run every stage for one request and report how it ended.
    pub async fn run(
        &self,
        request: &InterceptedRequest,
        writer: &mut dyn ResponseWriter,
    ) -> PipelineOutcome {
        let article = match self.filter.evaluate(&request.host, &request.path) {
            Eligibility::Eligible(article) => article,
            Eligibility::NotEligible(reason) => {
                debug!(
                    host = %request.host,
                    path = %request.path,
                    reason = %reason,
                    "request not eligible for inspection"
                );
                return PipelineOutcome::Skipped(SkipReason::NotEligible(reason));
            }
        };

        let inspection = match self.inspect(&article, &request.origin).await {
            Ok(inspection) => inspection,
            Err(diagnostic) => {
                warn!(
                    article = %article,
                    stage = %diagnostic.stage,
                    error = %diagnostic.message,
                    "revision inspection failed, passing request through"
                );
                return PipelineOutcome::Failed(diagnostic);
            }
        };

        match inspection.decision {
            Decision::NoRedirectNeeded => {
                debug!(article = %article, "newest revision is by a registered user");
                PipelineOutcome::PassThrough
            }
            Decision::NoRegisteredRevisionFound => {
                info!(
                    article = %article,
                    revisions = inspection.revisions.len(),
                    "no registered-user revision in history window"
                );
                PipelineOutcome::Skipped(SkipReason::NoRegisteredRevision)
            }
            Decision::RedirectTo(revision) => {
                match self.responder.respond(writer, &article, &revision).await {
                    Ok(()) => PipelineOutcome::RedirectSent(revision),
                    Err(e) => {
                        warn!(article = %article, revision = %revision, error = %e, "failed to write redirect");
                        PipelineOutcome::Failed(Diagnostic::new(Stage::Responding, e.to_string()))
                    }
                }
            }
        }
    }

    /// Fetch, parse and decide for `article` without touching any client.
    ///
    /// # Errors
    ///
    /// Returns a [`Diagnostic`] naming the stage that failed.
    pub async fn inspect(&self, article: &str, origin: &str) -> Result<Inspection, Diagnostic> {
        let document = self
            .source
            .fetch(article, origin)
            .await
            .map_err(|e| Diagnostic::new(Stage::Fetching, e.to_string()))?;

        let revisions =
            parse_history(&document).map_err(|e| Diagnostic::new(Stage::Parsing, e.to_string()))?;

        let decision = decide(&revisions);
        debug!(
            article = %article,
            revisions = revisions.len(),
            decision = ?decision,
            "revision history decided"
        );
        Ok(Inspection {
            revisions,
            decision,
        })
    }
}

impl std::fmt::Debug for RevisionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionPipeline")
            .field("filter", &self.filter)
            .field("responder", &self.responder)
            .finish_non_exhaustive()
    }
}
