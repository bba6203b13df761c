// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the challan crates.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ChallanError;

/// Maximum number of proof files attached to one submission.
pub const MAX_ATTACHMENTS: usize = 4;

/// Timestamp format used in durable rows and serialized payloads.
///
/// Fixed-width UTC text so that lexicographic order equals chronological
/// order (the queue relies on this for FIFO and expiry comparisons).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Format a UTC instant in the row timestamp format.
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a row timestamp back into a UTC instant.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ChallanError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| ChallanError::Encoding(format!("invalid timestamp `{s}`: {e}")))
}

/// Client-generated unique identifier for one submission attempt.
///
/// Doubles as the idempotency identifier: it is sent on every delivery
/// attempt so the server can detect a replay of an already-accepted
/// submission and not issue a duplicate challan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a submission attempt.
///
/// Transitions are monotonic: `Delivered` and `FailedPermanently` are
/// terminal, and a submission never regresses from `Delivered` back to
/// `Pending`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    /// Created by the issuance form, not yet handed to the network.
    Pending,
    /// An immediate delivery attempt is awaiting the server response.
    InFlight,
    /// Durably persisted for deferred replay.
    Queued,
    /// The server acknowledged exactly one successful delivery.
    Delivered,
    /// Terminal failure: retention expired or the server rejected it.
    FailedPermanently,
}

/// One user-selected proof file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A flattened bitmap snapshot of the hand-drawn signature.
///
/// Only the rendered raster is retained; stroke-level data never leaves
/// the signature pad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureImage {
    pub width: u32,
    pub height: u32,
    /// PNG-encoded pixels.
    pub png: Vec<u8>,
}

/// One user-initiated challan issuance.
#[derive(Debug, Clone)]
pub struct SubmissionAttempt {
    pub id: SubmissionId,
    /// Opaque passenger/offense form fields.
    pub fields: BTreeMap<String, String>,
    /// Ordered proof files, at most [`MAX_ATTACHMENTS`].
    pub attachments: Vec<Attachment>,
    pub signature: Option<SignatureImage>,
    pub created_at: DateTime<Utc>,
    pub status: SubmissionStatus,
}

impl SubmissionAttempt {
    /// Create a pending attempt with a fresh identifier and no attachments.
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self {
            id: SubmissionId::generate(),
            fields,
            attachments: Vec::new(),
            signature: None,
            created_at: Utc::now(),
            status: SubmissionStatus::Pending,
        }
    }

    /// Drop attachments and signature, returning whether anything was dropped.
    ///
    /// Called before persisting: queue entries never store binary blobs.
    pub fn strip_attachments(&mut self) -> bool {
        let had_any = !self.attachments.is_empty() || self.signature.is_some();
        self.attachments.clear();
        self.signature = None;
        had_any
    }
}

/// The durable serialized form of a submission while it waits for replay.
///
/// Deliberately excludes attachments and signature: offline entries are
/// bounded to form-field text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedSubmission {
    pub submission_id: SubmissionId,
    pub fields: BTreeMap<String, String>,
    pub created_at: String,
}

impl QueuedSubmission {
    pub fn from_attempt(attempt: &SubmissionAttempt) -> Self {
        Self {
            submission_id: attempt.id.clone(),
            fields: attempt.fields.clone(),
            created_at: format_timestamp(attempt.created_at),
        }
    }

    /// Reconstruct an in-memory attempt for a replay delivery.
    pub fn into_attempt(self) -> Result<SubmissionAttempt, ChallanError> {
        let created_at = parse_timestamp(&self.created_at)?;
        Ok(SubmissionAttempt {
            id: self.submission_id,
            fields: self.fields,
            attachments: Vec::new(),
            signature: None,
            created_at,
            status: SubmissionStatus::Queued,
        })
    }
}

/// A durable queue row owned by the offline submission queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: i64,
    pub submission_id: String,
    /// JSON-serialized [`QueuedSubmission`].
    pub payload: String,
    pub attempts: i32,
    pub status: String,
    pub enqueued_at: String,
    /// Retention deadline, fixed at enqueue time and never extended.
    pub expires_at: String,
    pub locked_until: Option<String>,
}

/// Why a submission ended in `failed-permanently`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The retention window elapsed without a successful replay.
    Expired,
    /// The server rejected the submission (validation, auth, conflict).
    Rejected,
}

/// A durable record of a terminal failure.
///
/// Retention expiry is surfaced asynchronously -- the user has long left
/// the submission screen -- so failures land in this persistent list
/// rather than a transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedSubmission {
    pub submission_id: String,
    pub payload: String,
    pub kind: FailureKind,
    pub detail: String,
    pub failed_at: String,
}

/// Whether the device currently has network connectivity to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reachability {
    Online,
    Offline,
}

impl Reachability {
    pub fn is_online(self) -> bool {
        matches!(self, Reachability::Online)
    }
}

/// Server-side outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The server accepted the submission.
    Accepted,
    /// The server had already accepted this idempotency identifier.
    /// Treated as success: the earlier reply was lost, not the challan.
    AlreadyAccepted,
    /// Permanent application-level rejection. Never retried.
    Rejected { reason: String },
}

/// Result of handing a submission to the offline queue.
///
/// `submit` never raises across the public boundary; every path is a
/// distinct variant for the UI to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Delivered synchronously; the server acknowledged it.
    Delivered { submission_id: SubmissionId },
    /// Durably persisted for deferred replay.
    Queued {
        submission_id: SubmissionId,
        /// True when attachments were dropped before persisting
        /// (online attempt that fell back to the queue).
        attachments_dropped: bool,
        expires_at: String,
    },
    /// Permanent server rejection, surfaced synchronously. Not persisted.
    Rejected {
        submission_id: SubmissionId,
        reason: String,
    },
    /// The queue could not persist the entry. Offline submission is
    /// unavailable; silently dropping it would violate the no-loss
    /// guarantee.
    Unavailable {
        submission_id: SubmissionId,
        reason: String,
    },
}

/// Summary of one replay cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Entries delivered and removed this cycle.
    pub delivered: u64,
    /// Entries removed after a permanent server rejection.
    pub rejected: u64,
    /// Entries dropped because their retention deadline elapsed.
    pub expired: u64,
    /// Entries still queued when the cycle ended.
    pub retained: u64,
    /// True when the cycle stopped early on a transient transport
    /// failure; the replayer backs off before the next cycle.
    pub stalled: bool,
}

/// A lifecycle transition broadcast to interested listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEvent {
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
}
