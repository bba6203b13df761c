// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./challan.toml` > `~/.config/challan/challan.toml` > `/etc/challan/challan.toml`
//! with environment variable overrides via `CHALLAN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ChallanConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/challan/challan.toml` (system-wide)
/// 3. `~/.config/challan/challan.toml` (user XDG config)
/// 4. `./challan.toml` (local directory)
/// 5. `CHALLAN_*` environment variables
pub fn load_config() -> Result<ChallanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChallanConfig::default()))
        .merge(Toml::file("/etc/challan/challan.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("challan/challan.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("challan.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ChallanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChallanConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChallanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChallanConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CHALLAN_QUEUE_RETENTION_HOURS` must
/// map to `queue.retention_hours`, not `queue.retention.hours`.
fn env_provider() -> Env {
    Env::prefixed("CHALLAN_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CHALLAN_SERVER_BASE_URL -> "server_base_url"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("queue_", "queue.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.service.name, "challan");
        assert_eq!(config.queue.retention_hours, 24);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str(
            r#"
[queue]
retention_hours = 48
"#,
        )
        .unwrap();
        assert_eq!(config.queue.retention_hours, 48);
        assert_eq!(config.queue.replay_interval_secs, 60);
        assert_eq!(config.storage.database_path, "challan.db");
    }
}
