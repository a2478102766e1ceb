// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./leadrelay.toml` > `~/.config/leadrelay/leadrelay.toml` >
//! `/etc/leadrelay/leadrelay.toml`, with `LEADRELAY_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LeadRelayConfig;

pub(crate) const LOCAL_CONFIG: &str = "leadrelay.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/leadrelay/leadrelay.toml";

/// Config sections that may be targeted by `LEADRELAY_<SECTION>_<KEY>` variables.
const SECTIONS: &[&str] = &[
    "agent", "leads", "campaign", "whatsapp", "openai", "trello", "gateway",
];

fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("leadrelay").join(LOCAL_CONFIG))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/leadrelay/leadrelay.toml`
/// 3. `~/.config/leadrelay/leadrelay.toml`
/// 4. `./leadrelay.toml`
/// 5. `LEADRELAY_*` environment variables
pub fn load_config() -> Result<LeadRelayConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<LeadRelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadRelayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadRelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadRelayConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the standard lookup, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LeadRelayConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Maps `LEADRELAY_WHATSAPP_PHONE_NUMBER_ID` to `whatsapp.phone_number_id`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that contain underscores stay intact.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section)
            && let Some(field) = rest.strip_prefix('_')
        {
            return format!("{section}.{field}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("LEADRELAY_").map(|key| map_env_key(key.as_str()).into())
}
