// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue operations for crash-safe offline submission replay.
//!
//! FIFO order is rowid order: `AUTOINCREMENT` row ids are monotonic with
//! enqueue time, so "oldest first" never reorders on retry.

use chrono::{DateTime, Duration, Utc};
use rusqlite::params;

use challan_core::types::{format_timestamp, QueueEntry};
use challan_core::ChallanError;

use crate::database::{map_tr_err, Database};

/// How long a delivery attempt may hold an entry before a crashed
/// process's lock is considered stale and the entry becomes eligible
/// again.
const LOCK_TIMEOUT_MINUTES: i64 = 5;

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<QueueEntry, rusqlite::Error> {
    Ok(QueueEntry {
        id: row.get(0)?,
        submission_id: row.get(1)?,
        payload: row.get(2)?,
        attempts: row.get(3)?,
        status: row.get(4)?,
        enqueued_at: row.get(5)?,
        expires_at: row.get(6)?,
        locked_until: row.get(7)?,
    })
}

const ENTRY_COLUMNS: &str =
    "id, submission_id, payload, attempts, status, enqueued_at, expires_at, locked_until";

/// Insert a new entry. Returns the auto-generated row id.
///
/// `expires_at` is the retention deadline, fixed here and never extended.
pub async fn enqueue(
    db: &Database,
    submission_id: &str,
    payload: &str,
    enqueued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<i64, ChallanError> {
    let submission_id = submission_id.to_string();
    let payload = payload.to_string();
    let enqueued_at = format_timestamp(enqueued_at);
    let expires_at = format_timestamp(expires_at);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO submission_queue (submission_id, payload, enqueued_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![submission_id, payload, enqueued_at, expires_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Atomically select the oldest unexpired entry eligible for a delivery
/// attempt and mark it as "processing" with a lock timeout.
///
/// Eligible entries are pending ones plus processing ones whose lock has
/// gone stale (a crash between server-ack and local deletion leaves such a
/// row; replaying it is safe because the idempotency identifier makes the
/// server treat the duplicate as already accepted). Returns `None` when
/// nothing is eligible at `now`.
pub async fn next_pending(
    db: &Database,
    now: DateTime<Utc>,
) -> Result<Option<QueueEntry>, ChallanError> {
    let now_text = format_timestamp(now);
    let locked_until = format_timestamp(now + Duration::minutes(LOCK_TIMEOUT_MINUTES));
    db.connection()
        .call(move |conn| {
            // Use a transaction to atomically find + lock the next entry.
            let tx = conn.transaction()?;

            let result = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {ENTRY_COLUMNS}
                     FROM submission_queue
                     WHERE expires_at > ?1
                       AND (status = 'pending'
                            OR (status = 'processing' AND locked_until <= ?1))
                     ORDER BY id ASC
                     LIMIT 1"
                ))?;
                stmt.query_row(params![now_text], row_to_entry)
            };

            match result {
                Ok(entry) => {
                    tx.execute(
                        "UPDATE submission_queue
                         SET status = 'processing', locked_until = ?1
                         WHERE id = ?2",
                        params![locked_until, entry.id],
                    )?;
                    tx.commit()?;

                    // Return the entry with updated lock state.
                    Ok(Some(QueueEntry {
                        status: "processing".to_string(),
                        locked_until: Some(locked_until),
                        ..entry
                    }))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.commit()?;
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Remove an entry after the server acknowledged it (or reported it as
/// already accepted). Entries are destroyed on success, not archived.
pub async fn ack(db: &Database, id: i64) -> Result<(), ChallanError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM submission_queue WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Return an entry to the pending state after a transient delivery
/// failure, incrementing its attempt counter.
///
/// The entry keeps its row id and therefore its place in FIFO order;
/// retries never reorder the queue.
pub async fn release(db: &Database, id: i64) -> Result<(), ChallanError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE submission_queue
                 SET status = 'pending', locked_until = NULL, attempts = attempts + 1
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Remove every entry whose retention deadline is at or before `now`,
/// returning the removed rows so the caller can record terminal failures.
pub async fn sweep_expired(
    db: &Database,
    now: DateTime<Utc>,
) -> Result<Vec<QueueEntry>, ChallanError> {
    let now_text = format_timestamp(now);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let expired = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {ENTRY_COLUMNS}
                     FROM submission_queue
                     WHERE expires_at <= ?1
                     ORDER BY id ASC"
                ))?;
                let rows = stmt.query_map(params![now_text], row_to_entry)?;
                rows.collect::<Result<Vec<_>, _>>()?
            };

            tx.execute(
                "DELETE FROM submission_queue WHERE expires_at <= ?1",
                params![now_text],
            )?;
            tx.commit()?;

            Ok(expired)
        })
        .await
        .map_err(map_tr_err)
}

/// Number of entries currently awaiting replay (pending or locked).
pub async fn pending_count(db: &Database) -> Result<i64, ChallanError> {
    db.connection()
        .call(|conn| {
            let n = conn.query_row("SELECT COUNT(*) FROM submission_queue", [], |row| {
                row.get(0)
            })?;
            Ok(n)
        })
        .await
        .map_err(map_tr_err)
}
