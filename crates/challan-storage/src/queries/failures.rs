// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The durable pending-failures list.
//!
//! Terminal failures (retention expiry, permanent server rejection) are
//! recorded here so they survive until the user acknowledges them --
//! expiry fires long after the submission screen is gone.

use rusqlite::params;

use challan_core::types::FailedSubmission;
use challan_core::ChallanError;

use crate::database::{map_tr_err, Database};

/// Record a terminal failure. Recording the same submission twice keeps
/// the latest detail.
pub async fn record_failure(
    db: &Database,
    failure: &FailedSubmission,
) -> Result<(), ChallanError> {
    let failure = failure.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO failed_submissions
                     (submission_id, payload, kind, detail, failed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    failure.submission_id,
                    failure.payload,
                    failure.kind.to_string(),
                    failure.detail,
                    failure.failed_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List all recorded failures, newest first.
pub async fn list_failures(db: &Database) -> Result<Vec<FailedSubmission>, ChallanError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT submission_id, payload, kind, detail, failed_at
                 FROM failed_submissions
                 ORDER BY failed_at DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                let kind: String = row.get(2)?;
                Ok(FailedSubmission {
                    submission_id: row.get(0)?,
                    payload: row.get(1)?,
                    kind: kind.parse().map_err(|_| {
                        rusqlite::Error::InvalidColumnType(
                            2,
                            "kind".to_string(),
                            rusqlite::types::Type::Text,
                        )
                    })?,
                    detail: row.get(3)?,
                    failed_at: row.get(4)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Remove an acknowledged failure record.
pub async fn clear_failure(db: &Database, submission_id: &str) -> Result<(), ChallanError> {
    let submission_id = submission_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM failed_submissions WHERE submission_id = ?1",
                params![submission_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
