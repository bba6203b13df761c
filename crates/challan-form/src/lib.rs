// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Issuance-form leaves for the challan submission service.
//!
//! Signature capture (stroke log flattened to a PNG raster), proof
//! attachment collection (capped, offline-gated), and the form composer
//! that assembles a [`SubmissionAttempt`] for the offline queue.
//!
//! [`SubmissionAttempt`]: challan_core::SubmissionAttempt

pub mod attachments;
pub mod issuance;
pub mod signature;

use thiserror::Error;

pub use attachments::AttachmentCollector;
pub use issuance::IssuanceForm;
pub use signature::{SignaturePad, Stroke};

/// Errors surfaced by the form leaves.
#[derive(Debug, Error)]
pub enum FormError {
    /// More files than [`MAX_ATTACHMENTS`] were offered.
    ///
    /// [`MAX_ATTACHMENTS`]: challan_core::MAX_ATTACHMENTS
    #[error("too many attachments: {count} exceeds the cap of {}", challan_core::MAX_ATTACHMENTS)]
    TooManyAttachments { count: usize },

    /// Attachment input is disabled while offline.
    #[error("attachments are unavailable while offline")]
    Offline,

    /// Signature rasterization failed.
    #[error("signature rendering failed: {0}")]
    Signature(String),
}
