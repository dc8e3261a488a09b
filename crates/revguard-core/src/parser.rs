//! History export parser.
//!
//! Turns a MediaWiki `Special:Export` document into revision records,
//! preserving document order (newest first when fetched with `dir=desc`).
//!
//! ```xml
//! <mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">
//!   <page>
//!     <title>Cat</title>
//!     <revision>
//!       <id>103</id>
//!       <timestamp>2024-01-02T03:04:05Z</timestamp>
//!       <contributor><ip>1.2.3.4</ip></contributor>
//!     </revision>
//!   </page>
//! </mediawiki>
//! ```
//!
//! Element names are matched on their local name, so the export namespace
//! version does not matter.

use roxmltree::{Document, Node};

use revguard_types::{ContributorInfo, RevisionRecord};

use crate::error::ParseError;

/// Parse a history document into revisions, in document order.
///
/// Only the first `<page>` is read. A page without revisions yields an
/// empty list rather than an error.
pub fn parse_history(document: &str) -> Result<Vec<RevisionRecord>, ParseError> {
    let doc = Document::parse(document)?;
    let root = doc.root_element();
    if root.tag_name().name() != "mediawiki" {
        return Err(ParseError::UnexpectedRoot(root.tag_name().name().to_string()));
    }

    let page = child(root, "page").ok_or(ParseError::MissingPage)?;

    page.children()
        .filter(|n| n.is_element() && n.tag_name().name() == "revision")
        .enumerate()
        .map(|(index, node)| parse_revision(index, node))
        .collect()
}

fn parse_revision(index: usize, node: Node<'_, '_>) -> Result<RevisionRecord, ParseError> {
    let id = child_text(node, "id").ok_or(ParseError::MissingRevisionId { index })?;
    let contributor = child(node, "contributor")
        .map(|c| ContributorInfo {
            username: child_text(c, "username"),
            ip: child_text(c, "ip"),
        })
        .unwrap_or_default();

    Ok(RevisionRecord {
        id,
        contributor,
        timestamp: child_text(node, "timestamp"),
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Trimmed text of a child element; empty text counts as absent.
fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}
