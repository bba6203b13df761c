// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background replay driver.
//!
//! Owns the cadence of replay cycles: a steady interval while the queue
//! drains cleanly, capped exponential backoff while the server keeps
//! failing transiently, and an immediate cycle the moment reachability
//! flips from offline to online. The engine decides what happens inside
//! a cycle; this task only decides when cycles run.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use challan_core::types::Reachability;

use crate::engine::SubmissionQueue;

/// Periodic replay loop with transient-failure backoff.
pub struct Replayer {
    queue: Arc<SubmissionQueue>,
    reachability: watch::Receiver<Reachability>,
    base: Duration,
    max_backoff: Duration,
}

impl Replayer {
    pub fn new(
        queue: Arc<SubmissionQueue>,
        reachability: watch::Receiver<Reachability>,
        config: &challan_config::model::QueueConfig,
    ) -> Self {
        Self {
            queue,
            reachability,
            base: Duration::from_secs(config.replay_interval_secs),
            max_backoff: Duration::from_secs(config.max_backoff_secs),
        }
    }

    /// Drive replay cycles until the token is cancelled.
    ///
    /// While offline only the expiry sweep runs on each tick; the
    /// retention clock does not stop because the network did.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut delay = self.base;
        info!(
            interval_secs = self.base.as_secs(),
            max_backoff_secs = self.max_backoff.as_secs(),
            "replayer started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("replayer stopping");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    if self.reachability.borrow().is_online() {
                        delay = self.cycle(delay).await;
                    } else {
                        let expired = self.queue.expire().await;
                        if !expired.is_empty() {
                            warn!(count = expired.len(), "entries expired while offline");
                        }
                        delay = self.base;
                    }
                }
                changed = self.reachability.changed() => {
                    if changed.is_err() {
                        // Probe gone; nothing left to wake us.
                        info!("reachability channel closed, replayer stopping");
                        break;
                    }
                    if self.reachability.borrow_and_update().is_online() {
                        info!("reachability restored, replaying immediately");
                        delay = self.cycle(self.base).await;
                    }
                }
            }
        }
    }

    async fn cycle(&self, current: Duration) -> Duration {
        let report = self.queue.replay().await;
        debug!(
            delivered = report.delivered,
            rejected = report.rejected,
            expired = report.expired,
            retained = report.retained,
            stalled = report.stalled,
            "replay cycle finished"
        );
        if report.stalled {
            let next = next_backoff(current, self.base, self.max_backoff);
            warn!(
                retained = report.retained,
                next_attempt_secs = next.as_secs(),
                "replay stalled on transient failure, backing off"
            );
            next
        } else {
            self.base
        }
    }
}

/// Double the current delay up to the cap. A fresh stall starts from the
/// base interval, not from zero.
fn next_backoff(current: Duration, base: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).clamp(base, max)
}
