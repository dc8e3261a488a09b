//! Revision-inspection pipeline for revguard.
//!
//! Given a request intercepted by a forward proxy, this crate decides
//! whether the wiki article it asks for was last edited anonymously and, if
//! so, redirects the client to the newest revision by a registered user.
//!
//! # Architecture
//!
//! - [`EligibilityFilter`] picks out plain article requests on the guarded wiki
//! - [`HistorySource`] fetches the article's recent history
//!   ([`HttpHistoryFetcher`] over HTTP)
//! - [`parse_history`] turns the export document into [`RevisionRecord`]s
//! - [`classify`] and [`decide`] choose the revision to show
//! - [`RedirectResponder`] writes the `302` through a [`ResponseWriter`]
//! - [`RevisionPipeline`] runs all of the above in order, failing open
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use revguard_core::{InterceptedRequest, ResponseSlot, RevisionPipeline};
//! use revguard_types::RevguardConfig;
//!
//! let pipeline = RevisionPipeline::new(&RevguardConfig::default())?;
//! let request = InterceptedRequest::new("en.wikipedia.org", "/wiki/Cat", "en.wikipedia.org");
//! let mut slot = ResponseSlot::new();
//!
//! let outcome = pipeline.run(&request, &mut slot).await;
//! if let Some(redirect) = slot.take() {
//!     // send `redirect` instead of forwarding the request
//! }
//! ```
//!
//! [`RevisionRecord`]: revguard_types::RevisionRecord

pub mod classifier;
pub mod config_loader;
pub mod decision;
pub mod eligibility;
pub mod error;
pub mod fetcher;
pub mod parser;
pub mod pipeline;
pub mod responder;

pub use classifier::classify;
pub use config_loader::load_config;
pub use decision::decide;
pub use eligibility::EligibilityFilter;
pub use error::{FetchError, ParseError, WriteError};
pub use fetcher::{HistorySource, HttpHistoryFetcher};
pub use parser::parse_history;
pub use pipeline::{InterceptedRequest, Inspection, RevisionPipeline};
pub use responder::{RedirectResponder, RedirectResponse, ResponseSlot, ResponseWriter};
