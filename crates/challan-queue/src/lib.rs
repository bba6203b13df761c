// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline submission queue for the challan service.
//!
//! Three pieces:
//!
//! - [`SubmissionQueue`]: accepts submission attempts, delivers them when
//!   the server is reachable, persists them when it is not, and replays
//!   queued entries oldest-first within the retention window.
//! - [`Replayer`]: the background task that schedules replay cycles,
//!   with capped exponential backoff while the server fails transiently.
//! - [`reachability_channel`]: the watch channel linking the probe to
//!   everything that gates on connectivity.
//!
//! The queue never raises errors across its public surface; every path
//! is an outcome variant ([`SubmitOutcome`], [`ReplayReport`]) so hosts
//! can render the state directly.
//!
//! [`SubmitOutcome`]: challan_core::types::SubmitOutcome
//! [`ReplayReport`]: challan_core::types::ReplayReport

pub mod engine;
pub mod reachability;
pub mod replayer;

pub use engine::SubmissionQueue;
pub use reachability::reachability_channel;
pub use replayer::Replayer;
