//! SAS4 License Search Server
//!
//! Exposes license search, swap and renewal invoicing over HTTP, backed by
//! the SAS4 licensing platform.
//!
//! Usage:
//!   SAS4_EMAIL=ops@example.com SAS4_PASSWORD=... SAS4_ENCRYPTION_KEY=... \
//!     sas4-license-server --port 3000

use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use sas4_client::{config::DEFAULT_BASE_URL, RemoteClient, RemoteConfig, SystemClock};
use sas4_license_server::{build_router, load_pricing, AppState, SERVICE_NAME};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sas4-license-server")]
#[command(about = "HTTP front end for SAS4 license search, swap and invoicing")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// SAS4 API root
    #[arg(long, env = "SAS4_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Operator account email
    #[arg(long, env = "SAS4_EMAIL")]
    email: String,

    /// Operator account password
    #[arg(long, env = "SAS4_PASSWORD", hide_env_values = true)]
    password: String,

    /// Passphrase for request payload encryption
    #[arg(long, env = "SAS4_ENCRYPTION_KEY", hide_env_values = true)]
    encryption_key: String,

    /// JSON pricing table for renewal invoices (built-in table if omitted)
    #[arg(long, env = "SAS4_PRICING_FILE")]
    pricing: Option<PathBuf>,

    /// Per-request timeout against the platform, in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let pricing = load_pricing(args.pricing.as_deref())?;

    let config = RemoteConfig {
        base_url: args.base_url,
        email: args.email,
        password: args.password,
        encryption_key: args.encryption_key,
        timeout_secs: args.timeout_secs,
        ..Default::default()
    };
    info!("Using SAS4 platform at {}", config.base_url);
    let client = RemoteClient::new(config).context("Invalid SAS4 platform configuration")?;

    let state = Arc::new(AppState::new(
        Arc::new(client),
        pricing,
        Arc::new(SystemClock),
    ));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .with_context(|| format!("Failed to bind port {}", args.port))?;

    info!("{} running on http://0.0.0.0:{}", SERVICE_NAME, args.port);
    info!("Health check: http://localhost:{}/health", args.port);
    info!("Search license: POST http://localhost:{}/api/search-license", args.port);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
