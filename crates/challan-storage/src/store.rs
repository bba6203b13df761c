// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`SubmissionStore`] trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use challan_config::model::StorageConfig;
use challan_core::types::{FailedSubmission, QueueEntry};
use challan_core::{ChallanError, SubmissionStore};

use crate::database::Database;
use crate::queries;

/// SQLite-backed submission store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily opened on the first call
/// to [`SqliteStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new store with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is
    /// called.
    ///
    /// [`initialize`]: SqliteStore::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database at the configured path and run migrations.
    pub async fn initialize(&self) -> Result<(), ChallanError> {
        let db = Database::open_with_wal(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ChallanError::Storage {
            source: "store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "submission store initialized");
        Ok(())
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), ChallanError> {
        self.db()?.close().await
    }

    /// Returns the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, ChallanError> {
        self.db.get().ok_or_else(|| ChallanError::Storage {
            source: "store not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl SubmissionStore for SqliteStore {
    async fn enqueue(
        &self,
        submission_id: &str,
        payload: &str,
        enqueued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<i64, ChallanError> {
        queries::queue::enqueue(self.db()?, submission_id, payload, enqueued_at, expires_at).await
    }

    async fn next_pending(&self, now: DateTime<Utc>) -> Result<Option<QueueEntry>, ChallanError> {
        queries::queue::next_pending(self.db()?, now).await
    }

    async fn ack(&self, id: i64) -> Result<(), ChallanError> {
        queries::queue::ack(self.db()?, id).await
    }

    async fn release(&self, id: i64) -> Result<(), ChallanError> {
        queries::queue::release(self.db()?, id).await
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Vec<QueueEntry>, ChallanError> {
        queries::queue::sweep_expired(self.db()?, now).await
    }

    async fn pending_count(&self) -> Result<i64, ChallanError> {
        queries::queue::pending_count(self.db()?).await
    }

    async fn record_failure(&self, failure: &FailedSubmission) -> Result<(), ChallanError> {
        queries::failures::record_failure(self.db()?, failure).await
    }

    async fn list_failures(&self) -> Result<Vec<FailedSubmission>, ChallanError> {
        queries::failures::list_failures(self.db()?).await
    }

    async fn clear_failure(&self, submission_id: &str) -> Result<(), ChallanError> {
        queries::failures::clear_failure(self.db()?, submission_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        let result = store.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert!(store.pending_count().await.is_err());
    }

    #[tokio::test]
    async fn queue_operations_through_store_trait() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("trait.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();

        let now = Utc::now();
        let id = store
            .enqueue("sub-1", r#"{"fields":{}}"#, now, now + Duration::hours(24))
            .await
            .unwrap();
        assert!(id > 0);
        assert_eq!(store.pending_count().await.unwrap(), 1);

        let entry = store.next_pending(now).await.unwrap().unwrap();
        assert_eq!(entry.submission_id, "sub-1");

        store.ack(entry.id).await.unwrap();
        assert_eq!(store.pending_count().await.unwrap(), 0);

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn queue_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("durable.db");
        let now = Utc::now();

        {
            let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
            store.initialize().await.unwrap();
            store
                .enqueue("sub-1", "{}", now, now + Duration::hours(24))
                .await
                .unwrap();
            store.close().await.unwrap();
        }

        // A fresh process sees the queued entry.
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();
        assert_eq!(store.pending_count().await.unwrap(), 1);
        let entry = store.next_pending(now).await.unwrap().unwrap();
        assert_eq!(entry.submission_id, "sub-1");
        store.close().await.unwrap();
    }
}
