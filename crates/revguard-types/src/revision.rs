//! Revision records as extracted from an article's history export.

use serde::{Deserialize, Serialize};

/// Contributor metadata exactly as found in the history document.
///
/// MediaWiki exports either a `<username>` (registered account) or an
/// `<ip>` (anonymous edit). Suppressed contributors carry neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorInfo {
    /// Account name, if the export listed one.
    #[serde(default)]
    pub username: Option<String>,

    /// IP address of an anonymous editor.
    #[serde(default)]
    pub ip: Option<String>,
}

impl ContributorInfo {
    /// Contributor identified by account name.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            username: Some(name.into()),
            ip: None,
        }
    }

    /// Contributor identified only by IP address.
    pub fn ip(address: impl Into<String>) -> Self {
        Self {
            username: None,
            ip: Some(address.into()),
        }
    }

    /// Contributor with no identifying information.
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// One entry in an article's edit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    /// Opaque revision identifier (MediaWiki `oldid`).
    pub id: String,

    /// Who made the edit.
    #[serde(default)]
    pub contributor: ContributorInfo,

    /// Edit timestamp, when present in the export.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl RevisionRecord {
    /// Create a record with no timestamp.
    pub fn new(id: impl Into<String>, contributor: ContributorInfo) -> Self {
        Self {
            id: id.into(),
            contributor,
            timestamp: None,
        }
    }
}

/// Classification of a revision's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContributorDescriptor {
    /// A persistent account name.
    RegisteredUser(String),
    /// An anonymous editor, either an explicit IP or a masked-IP username.
    AnonymousIp(String),
    /// No contributor information at all.
    Unknown,
}

impl ContributorDescriptor {
    /// Only registered users count when choosing a redirect target.
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::RegisteredUser(_))
    }
}

impl std::fmt::Display for ContributorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RegisteredUser(name) => write!(f, "user {name}"),
            Self::AnonymousIp(addr) => write!(f, "ip {addr}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}
