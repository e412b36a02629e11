//! Optional TOML configuration consumed by the binary.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use signal_intercept_core::GameTuning;

/// Contents of a configuration file; every table is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct CliConfig {
    /// Gameplay tuning overrides.
    pub(crate) tuning: GameTuning,
    /// Message service settings.
    pub(crate) uplink: UplinkConfig,
}

/// Settings for the remote message service.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct UplinkConfig {
    /// Model asked for transmissions.
    pub(crate) model: String,
    /// Base URL the model name is appended to.
    pub(crate) endpoint: String,
    /// Request timeout in milliseconds.
    pub(crate) timeout_ms: u64,
}

impl UplinkConfig {
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for UplinkConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_owned(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_owned(),
            timeout_ms: 10_000,
        }
    }
}

impl CliConfig {
    /// Reads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("failed to parse TOML")
    }
}
