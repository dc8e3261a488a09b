//! `revguard serve` -- run the forward proxy.
//!
//! ```text
//! revguard serve
//! revguard serve --listen 0.0.0.0:3128
//! revguard serve --upstream 127.0.0.1:8081
//! ```

use anyhow::Context;
use clap::Args;
use tokio::net::TcpListener;
use tracing::info;

use crate::proxy::{ProxyState, build_router};

use super::load_config;

/// Arguments for the `revguard serve` subcommand.
#[derive(Args)]
pub struct ServeArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,

    /// Address to listen on (overrides `proxy.listen`).
    #[arg(long)]
    pub listen: Option<String>,

    /// Send all origin traffic to this `host[:port]` instead of the
    /// request's host (overrides `proxy.upstream`).
    #[arg(long)]
    pub upstream: Option<String>,
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.proxy.listen = listen;
    }
    if let Some(upstream) = args.upstream {
        config.proxy.upstream = Some(upstream);
    }

    let state = ProxyState::new(&config).context("failed to build HTTP client")?;
    let listener = TcpListener::bind(&config.proxy.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.proxy.listen))?;

    info!(
        listen = %listener.local_addr()?,
        site = %config.site.host,
        upstream = config.proxy.upstream.as_deref().unwrap_or("(request host)"),
        history_limit = config.fetch.history_limit,
        "revguard proxy listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("proxy server error")?;

    info!("revguard proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
