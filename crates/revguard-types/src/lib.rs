//! Core types for revguard.
//!
//! This crate holds the data model shared by the inspection pipeline
//! (`revguard-core`) and the proxy binary (`revguard-cli`). It performs no
//! I/O.
//!
//! # Modules
//!
//! - [`revision`] -- revision records and contributor classification results
//! - [`outcome`] -- eligibility, decision, and pipeline outcome enums
//! - [`config`] -- configuration schema with defaults and validation
//! - [`error`] -- configuration error type

pub mod config;
pub mod error;
pub mod outcome;
pub mod revision;

pub use config::{FetchConfig, ProxyConfig, RevguardConfig, SiteConfig};
pub use error::ConfigError;
pub use outcome::{Decision, Diagnostic, Eligibility, NotEligible, PipelineOutcome, SkipReason, Stage};
pub use revision::{ContributorDescriptor, ContributorInfo, RevisionRecord};
