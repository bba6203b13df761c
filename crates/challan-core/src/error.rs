// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the challan submission service.

use thiserror::Error;

/// The primary error type used across the challan crates.
///
/// Public queue operations never return this type directly -- they return
/// outcome enums (see [`crate::types::SubmitOutcome`]) so the UI layer can
/// render each outcome distinctly. `ChallanError` flows between the internal
/// layers (storage, transport, encoding) with `?`.
#[derive(Debug, Error)]
pub enum ChallanError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport errors talking to the challan server. Always transient:
    /// a permanent server rejection is a [`DeliveryOutcome::Rejected`], not
    /// an error.
    ///
    /// [`DeliveryOutcome::Rejected`]: crate::types::DeliveryOutcome::Rejected
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Payload serialization or image encoding failure.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
