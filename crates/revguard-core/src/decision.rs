//! Redirect decision engine.
//!
//! Scans revisions newest-first and stops at the first one made by a
//! registered user. Revisions after that point are never classified.

use revguard_types::{ContributorDescriptor, Decision, RevisionRecord};

use crate::classifier::classify;

/// Decide whether the newest revision is trustworthy, using the standard
/// contributor classifier.
pub fn decide(revisions: &[RevisionRecord]) -> Decision {
    decide_with(revisions, classify)
}

/// Like [`decide`], with a caller-supplied classifier.
pub fn decide_with<F>(revisions: &[RevisionRecord], mut classify: F) -> Decision
where
    F: FnMut(&RevisionRecord) -> ContributorDescriptor,
{
    match revisions
        .iter()
        .position(|rev| classify(rev).is_registered())
    {
        Some(0) => Decision::NoRedirectNeeded,
        Some(index) => Decision::RedirectTo(revisions[index].id.clone()),
        None => Decision::NoRegisteredRevisionFound,
    }
}
