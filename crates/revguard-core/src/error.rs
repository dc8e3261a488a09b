//! Error types for the inspection pipeline.
//!
//! Each stage that can fail has its own error enum. None of these ever
//! reach the client: the orchestrator converts them into
//! [`PipelineOutcome::Failed`](revguard_types::PipelineOutcome::Failed)
//! and lets the original request through.

use std::time::Duration;

use thiserror::Error;

/// Errors from the secondary history request.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connecting to, writing to, or reading from the origin failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The exchange did not finish within the configured timeout.
    #[error("history fetch timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The origin answered with something other than 200. The body has
    /// been drained completely.
    #[error("upstream returned HTTP {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// Drained response body.
        body: String,
    },
}

impl FetchError {
    /// Status code of an upstream error response, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from parsing a history export document.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The body is not well-formed XML.
    #[error("malformed history document: {0}")]
    Malformed(#[from] roxmltree::Error),

    /// The root element is not `<mediawiki>`.
    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),

    /// The export contains no `<page>` element.
    #[error("history document has no page element")]
    MissingPage,

    /// A `<revision>` lacks its `<id>`.
    #[error("revision #{index} has no id")]
    MissingRevisionId {
        /// Zero-based position of the revision in the document.
        index: usize,
    },
}

/// Errors writing the redirect back to the client.
#[derive(Error, Debug)]
pub enum WriteError {
    /// A response was already written through this handle.
    #[error("a response was already written")]
    AlreadyWritten,

    /// The client connection is gone.
    #[error("client connection closed: {0}")]
    Closed(String),
}
