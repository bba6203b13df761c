// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use tokio_rusqlite::Connection;
use tracing::debug;

use challan_core::ChallanError;

/// Map a tokio-rusqlite error into the storage error variant.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> ChallanError {
    ChallanError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single SQLite connection behind the write-serializing
/// background thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// all pending migrations.
    pub async fn open(path: &str) -> Result<Self, ChallanError> {
        Self::open_with_wal(path, true).await
    }

    /// Open with explicit control over WAL journal mode.
    pub async fn open_with_wal(path: &str, wal_mode: bool) -> Result<Self, ChallanError> {
        let conn = Connection::open(path).await.map_err(map_tr_err)?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| {
            // run_migrations needs &mut rusqlite::Connection; any failure is
            // surfaced as a storage error below.
            match crate::migrations::run_migrations(conn) {
                Ok(()) => Ok(()),
                Err(e) => Err(tokio_rusqlite::Error::Other(format!("{e}").into())),
            }
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection. All query modules go
    /// through this handle.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the background thread.
    pub async fn close(&self) -> Result<(), ChallanError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
