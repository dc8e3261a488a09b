//! Outcome types produced by each pipeline stage.
//!
//! Every stage reports through a closed enum rather than a sentinel value,
//! so the orchestrator can match exhaustively on what happened:
//!
//! 1. [`Eligibility`] -- result of the request filter
//! 2. [`Decision`] -- result of walking the revision history
//! 3. [`PipelineOutcome`] -- what the orchestrator reports to the host

use serde::{Deserialize, Serialize};

// ── Eligibility ─────────────────────────────────────────────────────────

/// Why a request was not inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotEligible {
    /// The Host header is not the configured wiki.
    WrongHost,
    /// The path does not address an article.
    NotArticlePath,
    /// The article name contains `/`, `:`, `?` or `&`.
    UnexpectedCharacters,
}

impl std::fmt::Display for NotEligible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::WrongHost => "wrong host",
            Self::NotArticlePath => "not an article path",
            Self::UnexpectedCharacters => "unexpected characters",
        })
    }
}

/// Result of the eligibility filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// The request targets this article and should be inspected.
    Eligible(String),
    /// The request is passed through untouched.
    NotEligible(NotEligible),
}

// ── Decision ────────────────────────────────────────────────────────────

/// Result of scanning a revision list newest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "revision", rename_all = "snake_case")]
pub enum Decision {
    /// The newest revision is already by a registered user.
    NoRedirectNeeded,
    /// An older revision is the newest one by a registered user.
    RedirectTo(String),
    /// No revision in the window was by a registered user.
    NoRegisteredRevisionFound,
}

// ── Pipeline outcome ────────────────────────────────────────────────────

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Filtering,
    Fetching,
    Parsing,
    Deciding,
    Responding,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Filtering => "filtering",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Deciding => "deciding",
            Self::Responding => "responding",
        })
    }
}

/// Operational detail about a failed inspection. Never shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stage that failed.
    pub stage: Stage,
    /// Human-readable description of the failure.
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.message)
    }
}

/// Why the pipeline stopped without inspecting or redirecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The filter rejected the request.
    NotEligible(NotEligible),
    /// The history window held no registered-user revision.
    NoRegisteredRevision,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEligible(reason) => write!(f, "not eligible: {reason}"),
            Self::NoRegisteredRevision => f.write_str("no registered revision in history window"),
        }
    }
}

/// End state reported to the host once the pipeline is done.
///
/// Only [`PipelineOutcome::RedirectSent`] means the core wrote a response.
/// All other variants leave the original request to continue unmodified;
/// they differ only in what gets logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Inspected; the current revision is fine.
    PassThrough,
    /// A redirect to this revision was written to the client.
    RedirectSent(String),
    /// Inspection was not applicable.
    Skipped(SkipReason),
    /// Inspection failed; the request proceeds anyway.
    Failed(Diagnostic),
}

impl PipelineOutcome {
    /// Whether the host should continue handling the original request.
    pub fn passes_through(&self) -> bool {
        !matches!(self, Self::RedirectSent(_))
    }

    /// The redirect target, if one was sent.
    pub fn redirect_revision(&self) -> Option<&str> {
        match self {
            Self::RedirectSent(id) => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for PipelineOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PassThrough => f.write_str("pass-through"),
            Self::RedirectSent(id) => write!(f, "redirected to oldid={id}"),
            Self::Skipped(reason) => write!(f, "skipped ({reason})"),
            Self::Failed(diag) => write!(f, "failed ({diag})"),
        }
    }
}
