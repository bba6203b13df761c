// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the challan offline submission queue.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed
//! operations for the crash-safe submission queue and the durable
//! pending-failures list.
//!
//! # Single-writer model
//!
//! All writes are serialized through `tokio-rusqlite`'s single background
//! thread: [`Database`] wraps one `tokio_rusqlite::Connection`, every
//! query function accepts `&Database` and goes through `conn.call()`, and
//! that one connection IS the single writer. Do NOT create additional
//! Connection instances for writes -- this is what eliminates
//! SQLITE_BUSY under concurrent access.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

pub use database::Database;
pub use store::SqliteStore;
