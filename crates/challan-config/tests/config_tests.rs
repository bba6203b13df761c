// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the challan configuration system.

use challan_config::diagnostic::{suggest_key, ConfigError};
use challan_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_challan_config() {
    let toml = r#"
[service]
name = "station-kiosk-7"
log_level = "debug"

[server]
base_url = "https://challan.example.org"
request_timeout_secs = 10
probe_interval_secs = 15

[storage]
database_path = "/var/lib/challan/queue.db"
wal_mode = false

[queue]
retention_hours = 24
replay_interval_secs = 30
max_backoff_secs = 600
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "station-kiosk-7");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.server.base_url, "https://challan.example.org");
    assert_eq!(config.server.request_timeout_secs, 10);
    assert_eq!(config.server.probe_interval_secs, 15);
    assert_eq!(config.storage.database_path, "/var/lib/challan/queue.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.queue.retention_hours, 24);
    assert_eq!(config.queue.replay_interval_secs, 30);
    assert_eq!(config.queue.max_backoff_secs, 600);
}

/// Unknown field in [queue] section produces an error.
#[test]
fn unknown_field_in_queue_produces_error() {
    let toml = r#"
[queue]
retenton_hours = 24
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("retenton_hours"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// The diagnostic bridge suggests the intended key for a close typo.
#[test]
fn unknown_key_diagnostic_carries_suggestion() {
    let toml = r#"
[server]
base_utl = "https://challan.example.org"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce diagnostics");
    let found = errors.iter().any(|e| match e {
        ConfigError::UnknownKey { key, suggestion, .. } => {
            key == "base_utl" && suggestion.as_deref() == Some("base_url")
        }
        _ => false,
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

/// Wrong value type surfaces as an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type_diagnostic() {
    let toml = r#"
[queue]
retention_hours = "twenty-four"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce diagnostics");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "expected InvalidType, got: {errors:?}"
    );
}

/// Semantic validation failures come back as Validation diagnostics.
#[test]
fn semantic_validation_runs_after_deserialization() {
    let toml = r#"
[queue]
retention_hours = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(
        errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message } if message.contains("retention_hours")
        )),
        "expected retention_hours validation error, got: {errors:?}"
    );
}

/// Defaults-only load validates cleanly.
#[test]
fn empty_config_is_valid() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.service.name, "challan");
    assert_eq!(config.queue.retention_hours, 24);
}

/// suggest_key is exposed for the CLI's own diagnostics.
#[test]
fn suggest_key_public_api() {
    assert_eq!(
        suggest_key("databse_path", &["database_path", "wal_mode"]),
        Some("database_path".to_string())
    );
}
