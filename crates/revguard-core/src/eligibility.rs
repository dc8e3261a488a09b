//! Request filter: decides whether an intercepted request is a plain
//! article view on the guarded wiki.
//!
//! Rules are checked in order and the first failure wins:
//!
//! 1. Host header equals the configured host (exact, case-sensitive).
//! 2. Path starts with the article prefix.
//! 3. The article name contains none of `/`, `:`, `?`, `&`.

use revguard_types::{Eligibility, NotEligible, SiteConfig};

/// Characters that mark a path as something other than a plain article
/// (subpages, namespaces, query strings).
const DISALLOWED: &[char] = &['/', ':', '?', '&'];

/// Stateless filter bound to one site configuration.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    host: String,
    article_prefix: String,
}

impl EligibilityFilter {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            host: site.host.clone(),
            article_prefix: site.article_prefix.clone(),
        }
    }

    /// Classify a request by its Host header and path (including any query).
    pub fn evaluate(&self, host: &str, path: &str) -> Eligibility {
        if host != self.host {
            return Eligibility::NotEligible(NotEligible::WrongHost);
        }
        let Some(article) = path.strip_prefix(self.article_prefix.as_str()) else {
            return Eligibility::NotEligible(NotEligible::NotArticlePath);
        };
        if article.is_empty() {
            return Eligibility::NotEligible(NotEligible::NotArticlePath);
        }
        if article.contains(DISALLOWED) {
            return Eligibility::NotEligible(NotEligible::UnexpectedCharacters);
        }
        Eligibility::Eligible(article.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> EligibilityFilter {
        EligibilityFilter::new(&SiteConfig::default())
    }

    #[test]
    fn plain_article_is_eligible() {
        assert_eq!(
            filter().evaluate("en.wikipedia.org", "/wiki/Cat"),
            Eligibility::Eligible("Cat".into())
        );
    }

    #[test]
    fn encoded_article_name_kept_verbatim() {
        assert_eq!(
            filter().evaluate("en.wikipedia.org", "/wiki/Caf%C3%A9_au_lait"),
            Eligibility::Eligible("Caf%C3%A9_au_lait".into())
        );
    }

    #[test]
    fn wrong_prefix_not_eligible() {
        assert_eq!(
            filter().evaluate("en.wikipedia.org", "/notwiki/Cat"),
            Eligibility::NotEligible(NotEligible::NotArticlePath)
        );
        assert_eq!(
            filter().evaluate("en.wikipedia.org", "/w/index.php?title=Cat"),
            Eligibility::NotEligible(NotEligible::NotArticlePath)
        );
    }

    #[test]
    fn empty_article_not_eligible() {
        assert_eq!(
            filter().evaluate("en.wikipedia.org", "/wiki/"),
            Eligibility::NotEligible(NotEligible::NotArticlePath)
        );
    }

    #[test]
    fn query_string_not_eligible() {
        assert_eq!(
            filter().evaluate("en.wikipedia.org", "/wiki/Cat?x=1"),
            Eligibility::NotEligible(NotEligible::UnexpectedCharacters)
        );
    }

    #[test]
    fn each_disallowed_character_rejected() {
        for path in ["/wiki/Cat/Sub", "/wiki/Talk:Cat", "/wiki/Cat?", "/wiki/Cat&Dog"] {
            assert_eq!(
                filter().evaluate("en.wikipedia.org", path),
                Eligibility::NotEligible(NotEligible::UnexpectedCharacters),
                "{path}"
            );
        }
    }

    #[test]
    fn wrong_host_wins_regardless_of_path() {
        for path in ["/wiki/Cat", "/notwiki/Cat", "/wiki/Cat?x=1"] {
            assert_eq!(
                filter().evaluate("de.wikipedia.org", path),
                Eligibility::NotEligible(NotEligible::WrongHost)
            );
        }
    }

    #[test]
    fn host_compare_is_case_sensitive() {
        assert_eq!(
            filter().evaluate("EN.wikipedia.org", "/wiki/Cat"),
            Eligibility::NotEligible(NotEligible::WrongHost)
        );
    }

    #[test]
    fn custom_site() {
        let site = SiteConfig {
            host: "wiki.example.org".into(),
            article_prefix: "/page/".into(),
            ..SiteConfig::default()
        };
        let filter = EligibilityFilter::new(&site);
        assert_eq!(
            filter.evaluate("wiki.example.org", "/page/Dog"),
            Eligibility::Eligible("Dog".into())
        );
        assert_eq!(
            filter.evaluate("wiki.example.org", "/wiki/Dog"),
            Eligibility::NotEligible(NotEligible::NotArticlePath)
        );
    }
}
