// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the challan submission service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level challan configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChallanConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Challan server API settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Queue persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Offline queue retention and replay settings.
    #[serde(default)]
    pub queue: QueueConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "challan".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Challan server API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL of the challan server, e.g. `https://challan.example.org`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds for delivery attempts.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Interval in seconds between reachability probes of the health
    /// endpoint.
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            probe_interval_secs: default_probe_interval_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_probe_interval_secs() -> u64 {
    30
}

/// Queue persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "challan.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Offline queue retention and replay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Retention window in hours. An entry enqueued at T is never retried
    /// past T + retention_hours; it is dropped and must be resubmitted.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,

    /// Base interval in seconds between replay cycles while online.
    #[serde(default = "default_replay_interval_secs")]
    pub replay_interval_secs: u64,

    /// Cap in seconds for the exponential backoff applied after replay
    /// cycles that end in a transient failure.
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            retention_hours: default_retention_hours(),
            replay_interval_secs: default_replay_interval_secs(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

fn default_retention_hours() -> u64 {
    24
}

fn default_replay_interval_secs() -> u64 {
    60
}

fn default_max_backoff_secs() -> u64 {
    900
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ChallanConfig::default();
        assert_eq!(config.service.name, "challan");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.server.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.storage.database_path, "challan.db");
        assert!(config.storage.wal_mode);
        assert_eq!(config.queue.retention_hours, 24);
        assert_eq!(config.queue.replay_interval_secs, 60);
        assert_eq!(config.queue.max_backoff_secs, 900);
    }
}
