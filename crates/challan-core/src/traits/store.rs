// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable store seam for queue entries and the pending-failures list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ChallanError;
use crate::types::{FailedSubmission, QueueEntry};

/// Durable persistence for the offline submission queue.
///
/// The queue engine is the only mutator; display reads (`pending_count`,
/// `list_failures`) must not change state. The store survives process
/// restarts -- that is the whole point.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert a new queue entry. Returns the row id.
    ///
    /// `expires_at` is fixed here, at enqueue time, and is never extended
    /// by later retries.
    async fn enqueue(
        &self,
        submission_id: &str,
        payload: &str,
        enqueued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<i64, ChallanError>;

    /// Atomically select the oldest unexpired pending entry (FIFO by row
    /// id) and lock it for a delivery attempt. `None` when the queue has
    /// nothing eligible at `now`.
    async fn next_pending(&self, now: DateTime<Utc>) -> Result<Option<QueueEntry>, ChallanError>;

    /// Remove an entry after a successful (or already-accepted) delivery.
    async fn ack(&self, id: i64) -> Result<(), ChallanError>;

    /// Unlock an entry after a transient delivery failure, incrementing
    /// its attempt counter. The entry keeps its queue position.
    async fn release(&self, id: i64) -> Result<(), ChallanError>;

    /// Remove every entry whose retention deadline is at or before `now`,
    /// returning the removed rows so the engine can record failures.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Vec<QueueEntry>, ChallanError>;

    /// Number of entries currently awaiting replay. Read-only.
    async fn pending_count(&self) -> Result<i64, ChallanError>;

    /// Append to the durable pending-failures list.
    async fn record_failure(&self, failure: &FailedSubmission) -> Result<(), ChallanError>;

    /// The durable pending-failures list, newest first. Read-only.
    async fn list_failures(&self) -> Result<Vec<FailedSubmission>, ChallanError>;

    /// Remove a failure record once the user has acknowledged it.
    async fn clear_failure(&self, submission_id: &str) -> Result<(), ChallanError>;
}
