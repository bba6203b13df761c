// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `challan serve` command implementation.
//!
//! Starts the submission daemon: SQLite-backed offline queue, HTTP
//! delivery client, reachability probe, and the background replayer.
//! Entries left over from a previous run (including entries whose
//! process died mid-delivery) are picked up automatically on the first
//! replay cycle. Supports graceful shutdown via signal handlers.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use challan_client::{IssueClient, ReachabilityProbe};
use challan_config::model::ChallanConfig;
use challan_core::types::Reachability;
use challan_core::{ChallanError, SubmissionStore};
use challan_queue::{reachability_channel, Replayer, SubmissionQueue};
use challan_storage::SqliteStore;

use crate::shutdown;

/// Runs the `challan serve` command.
///
/// Wires storage, client, probe, queue, and replayer together and runs
/// until a shutdown signal arrives.
pub async fn run_serve(config: ChallanConfig) -> Result<(), ChallanError> {
    init_tracing(&config.service.log_level);

    info!(name = config.service.name.as_str(), "starting challan serve");

    // Initialize storage. Stale delivery locks from a crashed run are
    // reclaimed transparently when their timeout lapses.
    let store = {
        let store = SqliteStore::new(config.storage.clone());
        store.initialize().await?;
        Arc::new(store)
    };

    let leftover = store.pending_count().await.unwrap_or(0);
    if leftover > 0 {
        info!(count = leftover, "queued submissions from a previous run await replay");
    }

    // HTTP delivery client, shared by the probe and the queue.
    let client = IssueClient::new(&config.server)?;

    // Reachability starts pessimistic; the probe's first tick corrects it.
    let (reachability_tx, reachability_rx) = reachability_channel(Reachability::Offline);

    let queue = Arc::new(SubmissionQueue::new(
        store.clone(),
        Arc::new(client.clone()),
        reachability_rx.clone(),
        &config.queue,
    ));

    let cancel = shutdown::install_signal_handler();

    // Log lifecycle transitions as they happen.
    {
        let mut events = queue.subscribe();
        let event_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = event_cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(event) => {
                            info!(
                                submission_id = %event.submission_id,
                                status = %event.status,
                                "submission state changed"
                            );
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                            error!(missed, "submission event log fell behind");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
    }

    // Reachability probe: sole writer of the reachability signal.
    let probe = ReachabilityProbe::new(
        client,
        Duration::from_secs(config.server.probe_interval_secs),
        reachability_tx,
    );
    let probe_handle = tokio::spawn(probe.run(cancel.clone()));
    info!(
        interval_secs = config.server.probe_interval_secs,
        base_url = config.server.base_url.as_str(),
        "reachability probe started"
    );

    // Background replayer.
    let replayer = Replayer::new(queue.clone(), reachability_rx, &config.queue);
    let replayer_handle = tokio::spawn(replayer.run(cancel.clone()));

    cancel.cancelled().await;

    // Let the background tasks finish their current step before closing
    // the database underneath them.
    let _ = replayer_handle.await;
    let _ = probe_handle.await;
    store.close().await?;

    info!("challan serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("challan={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
