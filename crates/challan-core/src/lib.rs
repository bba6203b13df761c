// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the challan submission service.
//!
//! This crate provides the foundational trait seams, error type, and
//! domain types used throughout the challan workspace: the submission
//! lifecycle model, the durable queue-entry model, and the store and
//! transport traits the queue engine is wired against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ChallanError;
pub use traits::{DeliveryTransport, SubmissionStore};
pub use types::{
    DeliveryOutcome, QueueEntry, Reachability, SubmissionAttempt, SubmissionId,
    SubmissionStatus, SubmitOutcome, MAX_ATTACHMENTS,
};
