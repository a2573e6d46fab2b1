//! Breakroom service binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use integrations::PagerDutyClient;
use slack::SlackClient;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use barista::server::{build_router, AppState};
use barista::{Config, Notifier, Registrar};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("barista=info".parse()?))
        .init();

    info!("Starting Breakroom service...");

    let config = Config::from_env();

    if config.command_token.is_empty() {
        warn!("SLACK_COMMAND_TOKEN is not set; every slash command will be rejected");
    }
    if config.dry_run {
        info!("Dry run enabled; messaging and paging are suppressed");
    }

    let slack = SlackClient::new(&config.api_token);

    let pagerduty = config.pagerduty_routing_key.as_ref().map(|key| {
        info!("PagerDuty paging enabled");
        PagerDutyClient::new(key)
    });
    if pagerduty.is_none() {
        info!("No PAGERDUTY_ROUTING_KEY configured - paging disabled");
    }

    let notifier = Notifier::new(slack.clone(), pagerduty, &config.team_id, config.dry_run);
    let registrar = Arc::new(Registrar::from_config(&config, &notifier));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, "Server listening");

    let state = AppState {
        config: Arc::new(config),
        slack,
        notifier,
        registrar,
    };

    axum::serve(listener, build_router(state))
        .await
        .context("Server error")?;

    Ok(())
}
