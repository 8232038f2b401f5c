//! `parkctl` -- admin console for parking listing approval.
//!
//! Reconciles listings and approval requests from the backend and performs
//! approve / reject / toggle actions on them.
//!
//! # Environment variables
//!
//! | Variable                        | Required | Default                     | Description                       |
//! |---------------------------------|----------|-----------------------------|-----------------------------------|
//! | `PARKCTL_API_BASE`              | no       | `http://localhost:8000/api` | Backend API base URL              |
//! | `PARKCTL_ACCESS_TOKEN`          | no       | --                          | Bearer token                      |
//! | `PARKCTL_REQUEST_TIMEOUT_SECS`  | no       | `30`                        | Per-request timeout               |
//! | `PARKCTL_REJECT_POLICY`         | no       | `allow-delete-fallback`     | Or `require-reject-endpoint`      |
//! | `RUST_LOG`                      | no       | `parkctl=info`              | Log filter                        |

mod cli;
mod commands;
mod output;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use parkctl_core::capability::CapabilityMatrix;
use parkctl_engine::{AdminConsole, TracingNotifier};
use parkctl_store::{HttpListingStore, StoreConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "parkctl=debug" } else { "parkctl=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = StoreConfig::from_env()?;
    if let Some(api_base) = cli.api_base.as_deref() {
        config.api_base = api_base.trim_end_matches('/').to_string();
    }
    if let Some(token) = cli.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        config.access_token = Some(token.to_string());
    }

    tracing::debug!(
        api_base = %config.api_base,
        reject_policy = ?cli.reject_policy,
        "Starting parkctl",
    );

    let store = Arc::new(HttpListingStore::new(&config)?);
    let console = AdminConsole::new(
        store,
        CapabilityMatrix::new(cli.reject_policy),
        Arc::new(TracingNotifier),
    );

    commands::run(&console, cli.command, cli.format).await
}
