//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the license key, the sync webhook URL) are referenced by
//! env-var name in the config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;

use crate::engine::ScoringPolicy;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSection,
    pub auth: AuthConfig,
    #[serde(default)]
    pub scoring: ScoringPolicy,
    pub storage: StorageConfig,
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
    pub currency: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Name of the env var holding the shared license key.
    pub license_key_env: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory where per-institution backup snapshots are written.
    pub backup_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    pub enabled: bool,
    /// Name of the env var holding the webhook URL.
    pub webhook_url_env: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url_env: None,
            timeout_secs: 15,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// The license key, kept secret from logs and debug output.
    pub fn license_key(&self) -> Result<SecretString> {
        Self::resolve_env(&self.auth.license_key_env).map(SecretString::new)
    }

    /// Webhook URL when sync is enabled and its env var is set.
    pub fn webhook_url(&self) -> Option<String> {
        if !self.sync.enabled {
            return None;
        }
        self.sync
            .webhook_url_env
            .as_deref()
            .and_then(|env| std::env::var(env).ok())
            .filter(|url| !url.is_empty())
    }
}
