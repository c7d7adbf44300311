//! Configuration loading for the FireWS CLI
//!
//! Settings come from a TOML file (explicit `--config`, or the per-user
//! default if it exists), then command-line flags and `FIREWS_*`
//! environment variables override individual fields.

use anyhow::{Context, Result};
use firews_client::ClientConfig;
use std::path::{Path, PathBuf};

/// Values taken from flags or the environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub address: Option<String>,
    pub namespace: Option<String>,
    pub secret: Option<String>,
    pub timeout_ms: Option<u64>,
}

/// Get the default config file path
pub fn default_config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("firews")
        .join("config.toml")
}

/// Parse a TOML document into a client config
pub fn parse(contents: &str) -> Result<ClientConfig> {
    toml::from_str(contents).context("Invalid config file")
}

/// Load the config file. A missing default file is not an error.
pub fn load(path: Option<&Path>) -> Result<ClientConfig> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (default_config_file(), false),
    };

    if !required && !path.exists() {
        return Ok(ClientConfig::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse(&contents).with_context(|| format!("in {}", path.display()))
}

/// Apply flag and environment overrides on top of a loaded config
pub fn apply(mut config: ClientConfig, overrides: Overrides) -> ClientConfig {
    if let Some(address) = overrides.address {
        config.address = address;
    }
    if let Some(namespace) = overrides.namespace {
        config.namespace = Some(namespace);
    }
    if let Some(secret) = overrides.secret {
        config.secret_key = Some(secret);
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        config.connect_timeout_ms = timeout_ms;
    }
    config
}
