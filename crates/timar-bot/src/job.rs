// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timer display refresh job.
//!
//! Periodically rewrites the live message of every in-progress timelog with
//! the current elapsed time and a rebuilt stop/discard keyboard. Per-row
//! failures are logged and skipped; the loop only exits on cancellation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use timar_core::{MessageRef, MessagingGateway};
use timar_storage::queries::{tasks, timelogs};
use timar_storage::Database;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::handlers::timer_keyboard;
use crate::texts;

/// Sub-schema of a timelog's display metadata: the live message the job
/// edits on every tick. The storage layer carries it as an opaque string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayMetadata {
    pub message: MessageRef,
}

/// One reconciliation pass over all running timers.
pub async fn refresh_once<G: MessagingGateway>(gateway: &G, db: &Database, now: DateTime<Utc>) {
    let running = match timelogs::list_running(db).await {
        Ok(running) => running,
        Err(e) => {
            warn!(error = %e, "failed to list running timelogs");
            return;
        }
    };

    for timelog in running {
        let Some(raw) = timelog.display_metadata.as_deref() else {
            // Created but not yet announced; the next tick will catch it.
            debug!(timelog_id = timelog.id, "timelog has no display message yet");
            continue;
        };
        let metadata: DisplayMetadata = match serde_json::from_str(raw) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(timelog_id = timelog.id, error = %e, "unreadable display metadata");
                continue;
            }
        };

        let task = match tasks::get_task(db, timelog.task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                warn!(
                    timelog_id = timelog.id,
                    task_id = timelog.task_id,
                    "running timelog references a missing task"
                );
                continue;
            }
            Err(e) => {
                warn!(timelog_id = timelog.id, error = %e, "failed to load task");
                continue;
            }
        };

        let elapsed = texts::elapsed_or_zero(timelog.elapsed_text(now));
        let text = texts::timer_running(&task.name, &elapsed);
        let keyboard = match timer_keyboard(metadata.message.chat_id, timelog.id) {
            Ok(keyboard) => keyboard,
            Err(e) => {
                warn!(timelog_id = timelog.id, error = %e, "failed to build timer keyboard");
                continue;
            }
        };

        if let Err(e) = gateway
            .edit_message(&metadata.message, &text, Some(keyboard))
            .await
        {
            warn!(timelog_id = timelog.id, error = %e, "failed to refresh timer message");
        }
    }
}

/// Runs the refresh loop until `cancel` fires.
pub async fn run<G: MessagingGateway>(
    gateway: Arc<G>,
    db: Database,
    refresh_interval_ms: u64,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(Duration::from_millis(refresh_interval_ms));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(refresh_interval_ms, "timer refresh job started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("timer refresh job stopping");
                break;
            }
            _ = ticker.tick() => {
                refresh_once(gateway.as_ref(), &db, Utc::now()).await;
            }
        }
    }
}
