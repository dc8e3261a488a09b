//! `revguard check` -- inspect one article without proxying anything.
//!
//! Fetches the article's recent history from the origin, prints each
//! revision with its contributor classification, and reports what the
//! proxy would do.
//!
//! ```text
//! revguard check Cat
//! revguard check Cat --origin 127.0.0.1:8081
//! ```

use anyhow::Context;
use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};

use revguard_core::{Inspection, RedirectResponder, RevisionPipeline, classify};
use revguard_types::{Decision, RevguardConfig};

use super::load_config;

/// Arguments for the `revguard check` subcommand.
#[derive(Args)]
pub struct CheckArgs {
    /// Article name as it appears after the article prefix (e.g. `Cat`).
    pub article: String,

    /// `host[:port]` to fetch history from. Defaults to the configured
    /// upstream, then the site host.
    #[arg(long)]
    pub origin: Option<String>,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

pub async fn run(args: CheckArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let origin = resolve_origin(&config, args.origin);

    let pipeline = RevisionPipeline::new(&config).context("failed to build HTTP client")?;
    let inspection = pipeline
        .inspect(&args.article, &origin)
        .await
        .map_err(|diag| anyhow::anyhow!("{diag}"))?;

    println!("{}", revision_table(&inspection));
    println!(
        "{}",
        describe_decision(&config, &args.article, &inspection.decision)
    );
    Ok(())
}

fn resolve_origin(config: &RevguardConfig, explicit: Option<String>) -> String {
    explicit
        .or_else(|| config.proxy.upstream.clone())
        .unwrap_or_else(|| config.site.host.clone())
}

fn revision_table(inspection: &Inspection) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["#", "REVISION", "TIMESTAMP", "CONTRIBUTOR", "REGISTERED"]);
    for (index, rev) in inspection.revisions.iter().enumerate() {
        let contributor = classify(rev);
        table.add_row([
            index.to_string(),
            rev.id.clone(),
            rev.timestamp.clone().unwrap_or_else(|| "-".into()),
            contributor.to_string(),
            if contributor.is_registered() { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}

fn describe_decision(config: &RevguardConfig, article: &str, decision: &Decision) -> String {
    match decision {
        Decision::NoRedirectNeeded => {
            "newest revision is by a registered user; no redirect".to_string()
        }
        Decision::NoRegisteredRevisionFound => {
            "no registered-user revision in the history window; request would pass through"
                .to_string()
        }
        Decision::RedirectTo(revision) => format!(
            "would redirect to {}",
            RedirectResponder::new(&config.site).target_url(article, revision)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revguard_types::{ContributorInfo, RevisionRecord};

    #[test]
    fn origin_precedence() {
        let mut config = RevguardConfig::default();
        assert_eq!(resolve_origin(&config, None), "en.wikipedia.org");

        config.proxy.upstream = Some("10.0.0.5:80".into());
        assert_eq!(resolve_origin(&config, None), "10.0.0.5:80");
        assert_eq!(
            resolve_origin(&config, Some("127.0.0.1:9".into())),
            "127.0.0.1:9"
        );
    }

    #[test]
    fn describe_redirect_includes_target() {
        let text = describe_decision(
            &RevguardConfig::default(),
            "Cat",
            &Decision::RedirectTo("102".into()),
        );
        assert_eq!(
            text,
            "would redirect to http://en.wikipedia.org/wiki/Cat?oldid=102"
        );
    }

    #[test]
    fn table_lists_each_revision() {
        let inspection = Inspection {
            revisions: vec![
                RevisionRecord::new("103", ContributorInfo::user("1.2.3.xxx")),
                RevisionRecord::new("102", ContributorInfo::user("Alice")),
            ],
            decision: Decision::RedirectTo("102".into()),
        };
        let rendered = revision_table(&inspection).to_string();
        assert!(rendered.contains("103"));
        assert!(rendered.contains("ip 1.2.3.xxx"));
        assert!(rendered.contains("user Alice"));
    }
}
