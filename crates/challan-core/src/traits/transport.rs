// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery seam to the challan server API.

use async_trait::async_trait;

use crate::error::ChallanError;
use crate::types::{DeliveryOutcome, SubmissionAttempt};

/// One-shot delivery of a submission to the server.
///
/// The error taxonomy is carried in the signature: an `Err` is a
/// transient transport failure (connect, timeout, 5xx) and the caller may
/// retry; a permanent application rejection comes back as
/// `Ok(DeliveryOutcome::Rejected { .. })` and must not be retried.
///
/// Implementations must send the attempt's submission id as the
/// idempotency identifier on every call, including replays.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    async fn deliver(
        &self,
        attempt: &SubmissionAttempt,
    ) -> Result<DeliveryOutcome, ChallanError>;
}
