//! Kook gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p kook-gateway
//! cargo run -p kook-gateway -- probe --account main
//! ```
//!
//! Configuration is loaded from `kook.toml` and `KOOK__` environment variables.

use clap::Parser;
use kook_common::{
    try_init_tracing_with_config, AccountConfig, AppConfig, AppError, AppResult, TracingConfig,
};
use kook_gateway::api::probe_account;
use kook_gateway::cli::{Cli, Command};
use kook_gateway::host::{EchoReplyRouter, TracingStatusSink};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let result = match cli.into_command() {
        Command::Run => run(config).await,
        Command::Probe { account } => probe(&config, account.as_deref()).await,
    };

    if let Err(e) = result {
        error!(code = e.error_code(), fatal = e.is_fatal(), error = %e, "Kook gateway failed");
        std::process::exit(if e.is_fatal() { 2 } else { 1 });
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    info!(env = ?config.app.env, accounts = ?config.list_account_ids(), "Starting Kook gateway...");

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                shutdown.cancel();
            }
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    kook_gateway::run(
        config,
        Arc::new(EchoReplyRouter),
        Arc::new(TracingStatusSink),
        cancel,
    )
    .await?;

    info!("Kook gateway stopped");
    Ok(())
}

/// Check account tokens and print one JSON line per account
async fn probe(config: &AppConfig, account_id: Option<&str>) -> AppResult<()> {
    let accounts: Vec<AccountConfig> = match account_id {
        Some(id) => vec![config.account(id)?],
        None => config
            .list_account_ids()
            .iter()
            .map(|id| config.resolve_account(Some(id)))
            .collect(),
    };

    for account in accounts {
        let result = probe_account(&config.api, account.token().unwrap_or_default()).await;
        let line = serde_json::json!({
            "accountId": account.account_id,
            "tokenSource": account.token_source.as_str(),
            "probe": result,
        });
        println!("{}", serde_json::to_string(&line).map_err(AppError::internal)?);
    }
    Ok(())
}
