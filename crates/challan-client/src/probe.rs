// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reachability probe: the sole writer of the reachability signal.
//!
//! Periodically checks the server health endpoint and publishes
//! `Online`/`Offline` on a watch channel. Everything else in the system
//! (the issuance form's attachment gating, the queue's send-vs-persist
//! decision, the replayer's wakeup) only reads.

use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use challan_core::types::Reachability;

use crate::client::IssueClient;

/// Periodic health-endpoint poller feeding the reachability watch channel.
pub struct ReachabilityProbe {
    client: IssueClient,
    interval: Duration,
    tx: watch::Sender<Reachability>,
}

impl ReachabilityProbe {
    pub fn new(
        client: IssueClient,
        interval: Duration,
        tx: watch::Sender<Reachability>,
    ) -> Self {
        Self {
            client,
            interval,
            tx,
        }
    }

    /// Probe once and publish the result. Only transitions are logged and
    /// only transitions wake watchers (`send_if_modified`).
    pub async fn tick(&self) -> Reachability {
        let state = if self.client.probe_health().await {
            Reachability::Online
        } else {
            Reachability::Offline
        };

        let changed = self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            info!(?state, "reachability changed");
        } else {
            debug!(?state, "reachability unchanged");
        }
        state
    }

    /// Run until cancelled, probing on the configured interval.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("reachability probe stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
    }
}
