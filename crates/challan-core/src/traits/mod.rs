// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the queue engine and its collaborators.
//!
//! Both traits use `#[async_trait]` for dynamic dispatch so the engine can
//! be wired against real SQLite/HTTP in production and test doubles in
//! tests.

pub mod store;
pub mod transport;

pub use store::SubmissionStore;
pub use transport::DeliveryTransport;
