//! CLI command implementations for `revguard`.
//!
//! - [`serve`] -- forward proxy host.
//! - [`check`] -- one-off history inspection.
//! - [`config_cmd`] -- configuration display.

pub mod check;
pub mod config_cmd;
pub mod serve;

use std::path::Path;

use anyhow::Context;

use revguard_types::RevguardConfig;

/// Load configuration from the given path override or via auto-discovery.
///
/// Falls back to `REVGUARD_CONFIG`, then `~/.revguard/config.json`, then
/// built-in defaults.
pub fn load_config(config_override: Option<&str>) -> anyhow::Result<RevguardConfig> {
    revguard_core::load_config(config_override.map(Path::new)).context("failed to load config")
}
