// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `challan status` command implementation.
//!
//! Reports server reachability (via the health endpoint) and the local
//! queue state: entries awaiting replay and permanently failed
//! submissions that need attention. Works whether or not the daemon is
//! running; the queue database is the source of truth either way.

use std::io::IsTerminal;
use std::time::Duration;

use serde::Serialize;

use challan_config::model::ChallanConfig;
use challan_core::{ChallanError, SubmissionStore};
use challan_storage::SqliteStore;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub server_reachable: bool,
    pub base_url: String,
    pub pending: i64,
    pub failed: usize,
    pub database_path: String,
}

/// Run the `challan status` command.
///
/// Probes the server health endpoint and reads queue depth from the
/// local database. If `--json` is passed, outputs structured JSON for
/// scripting. If `--plain` is passed or stdout is not a TTY, disables
/// colors.
pub async fn run_status(
    config: &ChallanConfig,
    json: bool,
    plain: bool,
) -> Result<(), ChallanError> {
    let url = format!(
        "{}/api/health",
        config.server.base_url.trim_end_matches('/')
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| ChallanError::Internal(format!("failed to create HTTP client: {e}")))?;

    let server_reachable = matches!(
        client.get(&url).send().await,
        Ok(resp) if resp.status().is_success()
    );

    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;
    let pending = store.pending_count().await?;
    let failed = store.list_failures().await?;
    store.close().await?;

    if json {
        let status = StatusResponse {
            server_reachable,
            base_url: config.server.base_url.clone(),
            pending,
            failed: failed.len(),
            database_path: config.storage.database_path.clone(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();

    println!();
    println!("  challan status");
    println!("  {}", "-".repeat(35));

    if use_color {
        use colored::Colorize;
        if server_reachable {
            println!("    Server:   {} reachable ({})", "✓".green(), config.server.base_url);
        } else {
            println!("    Server:   {} unreachable ({})", "✗".red(), config.server.base_url);
        }
    } else if server_reachable {
        println!("    Server:   [OK] reachable ({})", config.server.base_url);
    } else {
        println!("    Server:   [FAIL] unreachable ({})", config.server.base_url);
    }

    println!("    Queued:   {pending} awaiting replay");
    if failed.is_empty() {
        println!("    Failed:   none");
    } else {
        println!("    Failed:   {} requiring re-entry", failed.len());
        for failure in failed.iter().take(5) {
            println!(
                "      - {} ({}, {})",
                failure.submission_id, failure.kind, failure.failed_at
            );
        }
        if failed.len() > 5 {
            println!("      ... and {} more", failed.len() - 5);
        }
    }
    println!("    Database: {}", config.storage.database_path);
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_serializes() {
        let resp = StatusResponse {
            server_reachable: true,
            base_url: "http://127.0.0.1:8080".to_string(),
            pending: 2,
            failed: 0,
            database_path: "challan.db".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"server_reachable\":true"));
        assert!(json.contains("\"pending\":2"));
    }

    #[test]
    fn status_response_unreachable_serializes() {
        let resp = StatusResponse {
            server_reachable: false,
            base_url: "http://127.0.0.1:8080".to_string(),
            pending: 0,
            failed: 1,
            database_path: "challan.db".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"server_reachable\":false"));
    }
}
