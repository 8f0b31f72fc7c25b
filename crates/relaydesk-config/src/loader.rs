// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./relaydesk.toml` > `~/.config/relaydesk/relaydesk.toml`
//! > `/etc/relaydesk/relaydesk.toml` with environment variable overrides via
//! `RELAYDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RelaydeskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/relaydesk/relaydesk.toml` (system-wide)
/// 3. `~/.config/relaydesk/relaydesk.toml` (user XDG config)
/// 4. `./relaydesk.toml` (local directory)
/// 5. `RELAYDESK_*` environment variables
pub fn load_config() -> Result<RelaydeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaydeskConfig::default()))
        .merge(Toml::file("/etc/relaydesk/relaydesk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("relaydesk/relaydesk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("relaydesk.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RelaydeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaydeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RelaydeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaydeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `RELAYDESK_ENGINE_END_KEYWORD` must map
/// to `engine.end_keyword`, not `engine.end.keyword`.
fn env_provider() -> Env {
    Env::prefixed("RELAYDESK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: RELAYDESK_ENGINE_END_KEYWORD -> "engine_end_keyword"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("engine_", "engine.", 1)
            .replacen("replies_", "replies.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("transcripts_", "transcripts.", 1);
        mapped.into()
    })
}
