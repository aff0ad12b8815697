// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `timar serve` command implementation.
//!
//! Wires the Telegram gateway, SQLite store, event dispatcher, and timer
//! refresh job together, and runs until Ctrl-C or an admin /shutdown.

use std::sync::Arc;

use timar_bot::{job, Bot};
use timar_config::model::TimarConfig;
use timar_core::TimarError;
use timar_storage::Database;
use timar_telegram::TelegramGateway;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Runs the `timar serve` command until shutdown.
pub async fn run_serve(config: TimarConfig) -> Result<(), TimarError> {
    init_tracing(&config.agent.log_level);
    info!(agent = %config.agent.name, "starting timar serve");

    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;
    info!(path = %config.storage.database_path, "database ready");

    let mut gateway = TelegramGateway::new(&config.telegram)?;
    gateway.connect();
    let gateway = Arc::new(gateway);

    let shutdown = CancellationToken::new();
    let admin_chat_id = config.telegram.admin_chat_id.filter(|id| *id != 0);
    let bot = Bot::new(
        gateway.clone(),
        db.clone(),
        admin_chat_id,
        shutdown.clone(),
    );

    let job_handle = tokio::spawn(job::run(
        gateway.clone(),
        db.clone(),
        config.job.refresh_interval_ms,
        shutdown.clone(),
    ));

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("shutdown requested");
                break;
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!(error = %e, "failed to listen for ctrl-c");
                }
                info!("ctrl-c received, shutting down");
                shutdown.cancel();
                break;
            }
            event = gateway.recv() => {
                match event {
                    Ok(event) => bot.handle_event(event).await,
                    Err(e) => {
                        error!(error = %e, "inbound channel failed, shutting down");
                        shutdown.cancel();
                        break;
                    }
                }
            }
        }
    }

    if let Err(e) = job_handle.await {
        error!(error = %e, "timer refresh job panicked");
    }
    db.close().await?;
    info!("timar serve stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("timar={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
