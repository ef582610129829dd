//! `remote-storage.toml` loading and merging with command-line overrides.
//!
//! Precedence, highest first: flags (or their environment variables), the
//! config file, built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use github::{GithubClientConfig, DEFAULT_API_BASE, DEFAULT_USER_AGENT};
use serde::Deserialize;
use storage::InteractionInterval;

pub const DEFAULT_CONFIG_PATH: &str = "remote-storage.toml";

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Log line format written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// The on-disk file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_base: Option<String>,
    pub user_agent: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub minimum_interaction_interval_ms: Option<u64>,
    pub cursor_path: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
    pub otlp_endpoint: Option<String>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads `path`. A missing file yields defaults unless `required` is set.
    pub fn load(path: &Path, required: bool) -> anyhow::Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("Failed to read config file '{}'", path.display()))
            }
        };
        Self::parse(&text).with_context(|| format!("Invalid config file '{}'", path.display()))
    }
}

/// Values supplied on the command line; `None` defers to the file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub api_base: Option<String>,
    pub user_agent: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub minimum_interaction_interval_ms: Option<u64>,
    pub cursor_path: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
    pub otlp_endpoint: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub minimum_interaction_interval: InteractionInterval,
    /// Where `poll-issues` persists its watermark. `None` keeps it in memory.
    pub cursor_path: Option<PathBuf>,
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Self {
        let interval_ms = overrides
            .minimum_interaction_interval_ms
            .or(file.minimum_interaction_interval_ms);
        Self {
            api_base: overrides
                .api_base
                .or(file.api_base)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            user_agent: overrides
                .user_agent
                .or(file.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            request_timeout: Duration::from_millis(
                overrides
                    .request_timeout_ms
                    .or(file.request_timeout_ms)
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
            ),
            minimum_interaction_interval: interval_ms
                .map(|ms| InteractionInterval::new(Duration::from_millis(ms)))
                .unwrap_or_default(),
            cursor_path: overrides.cursor_path.or(file.cursor_path),
            log_format: overrides.log_format.or(file.log_format).unwrap_or_default(),
            otlp_endpoint: overrides
                .otlp_endpoint
                .or(file.otlp_endpoint)
                .filter(|endpoint| !endpoint.trim().is_empty()),
        }
    }

    pub fn client_config(&self, token: &str) -> GithubClientConfig {
        GithubClientConfig::new(token)
            .with_api_base(self.api_base.clone())
            .with_user_agent(self.user_agent.clone())
            .with_request_timeout(self.request_timeout)
    }
}
