// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The offline submission queue.
//!
//! Guarantees that a challan issuance submitted while offline is not
//! lost, and is delivered exactly once to the server within the
//! retention window. Delivery relies on the client-generated submission
//! identifier for idempotency: replaying an entry whose earlier
//! acknowledgment was lost yields `AlreadyAccepted`, not a duplicate
//! challan.
//!
//! No public operation here returns an error. Every path comes back as a
//! distinct outcome variant for the caller to render.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use challan_config::model::QueueConfig;
use challan_core::types::{
    format_timestamp, FailedSubmission, FailureKind, QueuedSubmission, ReplayReport,
    SubmissionEvent, SubmissionId, SubmissionStatus, SubmitOutcome,
};
use challan_core::{
    ChallanError, DeliveryOutcome, DeliveryTransport, Reachability, SubmissionAttempt,
    SubmissionStore,
};

/// Capacity of the lifecycle event channel. Slow listeners lag rather
/// than block the queue.
const EVENT_CAPACITY: usize = 64;

/// The offline submission queue engine.
///
/// Exclusively owns the durable queue entries for their full lifetime;
/// the issuance form owns a [`SubmissionAttempt`] only until `submit`.
pub struct SubmissionQueue {
    store: Arc<dyn SubmissionStore>,
    transport: Arc<dyn DeliveryTransport>,
    reachability: watch::Receiver<Reachability>,
    retention: Duration,
    events: broadcast::Sender<SubmissionEvent>,
}

impl SubmissionQueue {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        transport: Arc<dyn DeliveryTransport>,
        reachability: watch::Receiver<Reachability>,
        config: &QueueConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            transport,
            reachability,
            retention: Duration::hours(config.retention_hours as i64),
            events,
        }
    }

    /// Subscribe to submission lifecycle transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, submission_id: &SubmissionId, status: SubmissionStatus) {
        // Nobody listening is fine.
        let _ = self.events.send(SubmissionEvent {
            submission_id: submission_id.clone(),
            status,
        });
    }

    /// Hand a submission attempt to the queue.
    ///
    /// Online: one immediate delivery attempt; a transient failure falls
    /// back to persisting, a permanent rejection is surfaced synchronously
    /// and persisted nowhere. Offline: persisted immediately with no
    /// network attempt.
    pub async fn submit(&self, mut attempt: SubmissionAttempt) -> SubmitOutcome {
        if !self.reachability.borrow().is_online() {
            debug!(submission_id = %attempt.id, "offline, queueing without delivery attempt");
            return self.persist(attempt).await;
        }

        attempt.status = SubmissionStatus::InFlight;
        self.emit(&attempt.id, SubmissionStatus::InFlight);

        match self.transport.deliver(&attempt).await {
            Ok(DeliveryOutcome::Accepted) | Ok(DeliveryOutcome::AlreadyAccepted) => {
                info!(submission_id = %attempt.id, "submission delivered");
                self.emit(&attempt.id, SubmissionStatus::Delivered);
                SubmitOutcome::Delivered {
                    submission_id: attempt.id,
                }
            }
            Ok(DeliveryOutcome::Rejected { reason }) => {
                warn!(submission_id = %attempt.id, %reason, "submission rejected by server");
                self.emit(&attempt.id, SubmissionStatus::FailedPermanently);
                SubmitOutcome::Rejected {
                    submission_id: attempt.id,
                    reason,
                }
            }
            Err(e) => {
                warn!(submission_id = %attempt.id, error = %e, "delivery failed, falling back to queue");
                self.persist(attempt).await
            }
        }
    }

    /// Persist an attempt as a durable queue entry.
    ///
    /// Binary blobs never reach the store: attachments and signature are
    /// stripped first and the caller is told they were.
    async fn persist(&self, mut attempt: SubmissionAttempt) -> SubmitOutcome {
        let attachments_dropped = attempt.strip_attachments();

        let payload = match serde_json::to_string(&QueuedSubmission::from_attempt(&attempt)) {
            Ok(payload) => payload,
            Err(e) => {
                error!(submission_id = %attempt.id, error = %e, "payload serialization failed");
                return SubmitOutcome::Unavailable {
                    submission_id: attempt.id,
                    reason: format!("payload serialization failed: {e}"),
                };
            }
        };

        let now = Utc::now();
        let expires_at = now + self.retention;
        match self
            .store
            .enqueue(attempt.id.as_str(), &payload, now, expires_at)
            .await
        {
            Ok(_) => {
                info!(
                    submission_id = %attempt.id,
                    expires_at = %format_timestamp(expires_at),
                    attachments_dropped,
                    "submission queued for replay"
                );
                self.emit(&attempt.id, SubmissionStatus::Queued);
                SubmitOutcome::Queued {
                    submission_id: attempt.id,
                    attachments_dropped,
                    expires_at: format_timestamp(expires_at),
                }
            }
            Err(e) => {
                // The no-loss guarantee forbids pretending this worked.
                error!(submission_id = %attempt.id, error = %e, "could not persist queue entry");
                SubmitOutcome::Unavailable {
                    submission_id: attempt.id,
                    reason: format!("offline queue unavailable: {e}"),
                }
            }
        }
    }

    /// Replay queued entries, oldest first, strictly one at a time.
    ///
    /// Expired entries are dropped before anything is attempted, so
    /// expiry runs at least once per replay cycle. A transient transport
    /// failure stops the cycle: the entry stays queued in place and the
    /// rest of the queue waits behind it, preserving FIFO order without
    /// hammering a network that just came back.
    pub async fn replay(&self) -> ReplayReport {
        let mut report = ReplayReport {
            expired: self.expire_at(Utc::now()).await.len() as u64,
            ..ReplayReport::default()
        };

        loop {
            let entry = match self.store.next_pending(Utc::now()).await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "could not read next queue entry");
                    report.stalled = true;
                    break;
                }
            };

            let submission_id = SubmissionId(entry.submission_id.clone());
            let attempt = match decode_entry_payload(&entry.payload) {
                Ok(attempt) => attempt,
                Err(e) => {
                    // Undeliverable forever; treat like a permanent rejection.
                    error!(submission_id = %submission_id, error = %e, "corrupt queue payload");
                    self.drop_permanently(
                        entry.id,
                        &submission_id,
                        &entry.payload,
                        FailureKind::Rejected,
                        &format!("corrupt queue payload: {e}"),
                    )
                    .await;
                    report.rejected += 1;
                    continue;
                }
            };

            debug!(submission_id = %submission_id, attempts = entry.attempts, "replaying queued submission");
            match self.transport.deliver(&attempt).await {
                Ok(DeliveryOutcome::Accepted) | Ok(DeliveryOutcome::AlreadyAccepted) => {
                    if let Err(e) = self.store.ack(entry.id).await {
                        error!(submission_id = %submission_id, error = %e, "ack failed after delivery");
                        report.stalled = true;
                        break;
                    }
                    info!(submission_id = %submission_id, "queued submission delivered");
                    self.emit(&submission_id, SubmissionStatus::Delivered);
                    report.delivered += 1;
                }
                Ok(DeliveryOutcome::Rejected { reason }) => {
                    warn!(submission_id = %submission_id, %reason, "queued submission rejected by server");
                    self.drop_permanently(
                        entry.id,
                        &submission_id,
                        &entry.payload,
                        FailureKind::Rejected,
                        &reason,
                    )
                    .await;
                    report.rejected += 1;
                }
                Err(e) => {
                    debug!(submission_id = %submission_id, error = %e, "replay attempt failed, retaining entry");
                    if let Err(release_err) = self.store.release(entry.id).await {
                        error!(submission_id = %submission_id, error = %release_err, "release failed");
                    }
                    report.stalled = true;
                    break;
                }
            }
        }

        report.retained = self.store.pending_count().await.unwrap_or(0) as u64;
        report
    }

    /// Drop every entry whose retention deadline has elapsed, recording
    /// each in the durable pending-failures list. Returns the expired
    /// submission ids.
    pub async fn expire(&self) -> Vec<SubmissionId> {
        self.expire_at(Utc::now()).await
    }

    /// `expire` with an explicit clock, so hosts and tests can drive the
    /// retention boundary deterministically.
    pub async fn expire_at(&self, now: DateTime<Utc>) -> Vec<SubmissionId> {
        let expired = match self.store.sweep_expired(now).await {
            Ok(expired) => expired,
            Err(e) => {
                error!(error = %e, "expiry sweep failed");
                return Vec::new();
            }
        };

        let mut ids = Vec::with_capacity(expired.len());
        for entry in expired {
            let submission_id = SubmissionId(entry.submission_id.clone());
            warn!(
                submission_id = %submission_id,
                enqueued_at = %entry.enqueued_at,
                "retention window elapsed, submission must be re-entered"
            );
            let failure = FailedSubmission {
                submission_id: entry.submission_id,
                payload: entry.payload,
                kind: FailureKind::Expired,
                detail: "retention window elapsed before delivery".to_string(),
                failed_at: format_timestamp(now),
            };
            if let Err(e) = self.store.record_failure(&failure).await {
                error!(submission_id = %submission_id, error = %e, "could not record expiry failure");
            }
            self.emit(&submission_id, SubmissionStatus::FailedPermanently);
            ids.push(submission_id);
        }
        ids
    }

    /// Number of entries awaiting replay. Read-only display query.
    pub async fn pending_count(&self) -> i64 {
        self.store.pending_count().await.unwrap_or(0)
    }

    /// The durable pending-failures list, newest first. Read-only.
    pub async fn failures(&self) -> Vec<FailedSubmission> {
        self.store.list_failures().await.unwrap_or_default()
    }

    /// Remove a failure record once the user has acknowledged it (and,
    /// typically, re-entered the challan).
    pub async fn acknowledge_failure(&self, submission_id: &SubmissionId) {
        if let Err(e) = self.store.clear_failure(submission_id.as_str()).await {
            error!(submission_id = %submission_id, error = %e, "could not clear failure record");
        }
    }

    async fn drop_permanently(
        &self,
        entry_id: i64,
        submission_id: &SubmissionId,
        payload: &str,
        kind: FailureKind,
        detail: &str,
    ) {
        if let Err(e) = self.store.ack(entry_id).await {
            error!(submission_id = %submission_id, error = %e, "could not remove rejected entry");
        }
        let failure = FailedSubmission {
            submission_id: submission_id.0.clone(),
            payload: payload.to_string(),
            kind,
            detail: detail.to_string(),
            failed_at: format_timestamp(Utc::now()),
        };
        if let Err(e) = self.store.record_failure(&failure).await {
            error!(submission_id = %submission_id, error = %e, "could not record failure");
        }
        self.emit(submission_id, SubmissionStatus::FailedPermanently);
    }
}

fn decode_entry_payload(payload: &str) -> Result<SubmissionAttempt, ChallanError> {
    let queued: QueuedSubmission = serde_json::from_str(payload)
        .map_err(|e| ChallanError::Encoding(format!("invalid payload JSON: {e}")))?;
    queued.into_attempt()
}
