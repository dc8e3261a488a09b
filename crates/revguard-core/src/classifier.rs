//! Contributor classifier.
//!
//! Decides whether a revision was made by a registered account. MediaWiki
//! hides anonymous editors' addresses in some exports by masking the last
//! octet (`203.0.113.xxx`) and placing the result in `<username>`; such
//! names are anonymous despite arriving in the username field.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use revguard_types::{ContributorDescriptor, RevisionRecord};

static MASKED_IP: OnceLock<Regex> = OnceLock::new();

fn masked_ip() -> &'static Regex {
    MASKED_IP.get_or_init(|| Regex::new(r"[0-9]+\.[0-9]+\.[0-9]+\.xxx").expect("static pattern"))
}

/// Whether a username is really a masked IPv4 address.
pub fn is_masked_ip(username: &str) -> bool {
    masked_ip().is_match(username)
}

/// Classify the author of one revision.
///
/// A username wins over an `<ip>` field when both are present; a masked-IP
/// username is anonymous.
pub fn classify(revision: &RevisionRecord) -> ContributorDescriptor {
    let contributor = &revision.contributor;
    let descriptor = match (&contributor.username, &contributor.ip) {
        (Some(name), _) if is_masked_ip(name) => ContributorDescriptor::AnonymousIp(name.clone()),
        (Some(name), _) => ContributorDescriptor::RegisteredUser(name.clone()),
        (None, Some(ip)) => ContributorDescriptor::AnonymousIp(ip.clone()),
        (None, None) => ContributorDescriptor::Unknown,
    };
    trace!(revision = %revision.id, contributor = %descriptor, "classified revision");
    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;
    use revguard_types::ContributorInfo;

    fn rev(contributor: ContributorInfo) -> RevisionRecord {
        RevisionRecord::new("1", contributor)
    }

    #[test]
    fn plain_username_is_registered() {
        assert_eq!(
            classify(&rev(ContributorInfo::user("Alice"))),
            ContributorDescriptor::RegisteredUser("Alice".into())
        );
    }

    #[test]
    fn masked_ip_username_is_anonymous() {
        assert_eq!(
            classify(&rev(ContributorInfo::user("1.2.3.xxx"))),
            ContributorDescriptor::AnonymousIp("1.2.3.xxx".into())
        );
        assert_eq!(
            classify(&rev(ContributorInfo::user("192.168.100.xxx"))),
            ContributorDescriptor::AnonymousIp("192.168.100.xxx".into())
        );
    }

    #[test]
    fn numeric_lookalikes_stay_registered() {
        for name in ["1.2.3.4", "1.2.xxx", "Version 2.0", "a.b.c.xxx"] {
            assert!(
                classify(&rev(ContributorInfo::user(name))).is_registered(),
                "{name} should be registered"
            );
        }
    }

    #[test]
    fn ip_field_is_anonymous() {
        assert_eq!(
            classify(&rev(ContributorInfo::ip("2001:db8::1"))),
            ContributorDescriptor::AnonymousIp("2001:db8::1".into())
        );
    }

    #[test]
    fn no_contributor_is_unknown() {
        let descriptor = classify(&rev(ContributorInfo::unknown()));
        assert_eq!(descriptor, ContributorDescriptor::Unknown);
        assert!(!descriptor.is_registered());
    }

    #[test]
    fn username_takes_precedence_over_ip() {
        let both = ContributorInfo {
            username: Some("Carol".into()),
            ip: Some("10.0.0.1".into()),
        };
        assert!(classify(&rev(both)).is_registered());
    }
}
