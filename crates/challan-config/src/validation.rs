// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as a well-formed server URL, non-empty paths, and
//! non-zero intervals.

use crate::diagnostic::ConfigError;
use crate::model::ChallanConfig;

/// Upper bound for `queue.retention_hours` (one year). Keeps the
/// deadline arithmetic safely inside `chrono::Duration` range.
pub const MAX_RETENTION_HOURS: u64 = 8760;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &ChallanConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate log level is a recognized tracing level or filter
    let level = config.service.log_level.trim();
    let known_level = matches!(
        level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    );
    if level.is_empty() || (!known_level && !level.contains('=')) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{level}` is not a log level (trace, debug, info, warn, error) or EnvFilter directive"
            ),
        });
    }

    // Validate base_url is an absolute http(s) URL
    let url = config.server.base_url.trim();
    if url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.base_url must not be empty".to_string(),
        });
    } else if !url.starts_with("http://") && !url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("server.base_url `{url}` must start with http:// or https://"),
        });
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "server.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.server.probe_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "server.probe_interval_secs must be at least 1".to_string(),
        });
    }

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate queue timings
    if config.queue.retention_hours == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.retention_hours must be at least 1".to_string(),
        });
    } else if config.queue.retention_hours > MAX_RETENTION_HOURS {
        errors.push(ConfigError::Validation {
            message: format!(
                "queue.retention_hours ({}) must not exceed {MAX_RETENTION_HOURS} (one year)",
                config.queue.retention_hours
            ),
        });
    }

    if config.queue.replay_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.replay_interval_secs must be at least 1".to_string(),
        });
    }

    if config.queue.max_backoff_secs < config.queue.replay_interval_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "queue.max_backoff_secs ({}) must not be below queue.replay_interval_secs ({})",
                config.queue.max_backoff_secs, config.queue.replay_interval_secs
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ChallanConfig::default()).is_ok());
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let mut config = ChallanConfig::default();
        config.server.base_url = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("server.base_url")));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let mut config = ChallanConfig::default();
        config.server.base_url = "ftp://challan.example.org".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_retention_is_rejected() {
        let mut config = ChallanConfig::default();
        config.queue.retention_hours = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("retention_hours")));
    }

    #[test]
    fn oversized_retention_is_rejected() {
        // A value this large would wrap negative when converted to a
        // signed hour count and expire entries on enqueue.
        let mut config = ChallanConfig::default();
        config.queue.retention_hours = u64::MAX;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("retention_hours")));

        config.queue.retention_hours = MAX_RETENTION_HOURS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn backoff_below_replay_interval_is_rejected() {
        let mut config = ChallanConfig::default();
        config.queue.replay_interval_secs = 120;
        config.queue.max_backoff_secs = 60;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn all_errors_are_collected_not_fail_fast() {
        let mut config = ChallanConfig::default();
        config.server.base_url = String::new();
        config.storage.database_path = String::new();
        config.queue.retention_hours = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3, "expected all errors, got {errors:?}");
    }

    #[test]
    fn env_filter_directive_log_level_is_accepted() {
        let mut config = ChallanConfig::default();
        config.service.log_level = "challan_queue=debug".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
