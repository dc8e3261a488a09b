//! `revguard config` -- display resolved configuration.
//!
//! ```text
//! revguard config
//! revguard config --section fetch
//! ```

use clap::Args;

use revguard_types::RevguardConfig;

use super::load_config;

/// Arguments for the `revguard config` subcommand.
#[derive(Args)]
pub struct ConfigArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,

    /// Only show this top-level section (site, fetch, proxy).
    #[arg(short, long)]
    pub section: Option<String>,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    println!("{}", render(&config, args.section.as_deref())?);
    Ok(())
}

fn render(config: &RevguardConfig, section: Option<&str>) -> anyhow::Result<String> {
    let value = serde_json::to_value(config)?;
    let shown = match section {
        None => &value,
        Some(name) => value.get(name).ok_or_else(|| {
            anyhow::anyhow!("unknown section '{name}' (available: site, fetch, proxy)")
        })?,
    };
    Ok(serde_json::to_string_pretty(shown)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_full_config() {
        let out = render(&RevguardConfig::default(), None).unwrap();
        assert!(out.contains("\"host\": \"en.wikipedia.org\""));
        assert!(out.contains("\"history_limit\": 5"));
    }

    #[test]
    fn render_section() {
        let out = render(&RevguardConfig::default(), Some("fetch")).unwrap();
        assert!(out.contains("export_page"));
        assert!(!out.contains("en.wikipedia.org"));
    }

    #[test]
    fn render_unknown_section_fails() {
        let err = render(&RevguardConfig::default(), Some("nope")).unwrap_err();
        assert!(err.to_string().contains("unknown section 'nope'"));
    }
}
