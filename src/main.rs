//! Solana transfer gateway
//!
//! HTTP service that builds unsigned SOL/SPL transfer transactions for
//! client-side signing and relays signed transactions to the network.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![warn(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use solpay_gateway::config::Config;
use solpay_gateway::ledger::RpcLedger;
use solpay_gateway::server::{router, AppState};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Bind address override
    #[arg(long, env = "BIND_ADDR")]
    bind: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(args.verbose);

    info!("Starting solpay gateway");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&args.config)?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    config.validate()?;

    let ledger = Arc::new(RpcLedger::new(
        config.rpc.url.clone(),
        Duration::from_secs(config.rpc.timeout_secs),
        config.commitment()?,
    ));
    let app = router(AppState { ledger });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(
        addr = %config.server.bind_addr,
        rpc = %config.rpc.url,
        commitment = %config.rpc.commitment,
        "gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
