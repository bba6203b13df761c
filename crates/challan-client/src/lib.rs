// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP collaborators for the challan submission service.
//!
//! This crate implements the [`DeliveryTransport`] seam against the
//! challan server's issuance endpoint (`POST /api/challan/issue`,
//! multipart, idempotency header) and provides the reachability probe
//! that feeds the process-wide online/offline signal.
//!
//! [`DeliveryTransport`]: challan_core::DeliveryTransport

pub mod client;
pub mod probe;

pub use client::IssueClient;
pub use probe::ReachabilityProbe;
