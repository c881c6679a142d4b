use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// Policy constants
// =============================================================================

/// No enforced app may publish a latest release older than this (days)
pub const DEFAULT_GLOBAL_MAX_AGE_DAYS: u32 = 180;

/// Default number of resolutions running at the same time
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Timeout for a single HTTP request in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_USER_AGENT: &str = concat!("release-resolver/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Engine configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub global_max_age_days: u32,
    pub concurrency: usize,
    pub transport: TransportConfig,
    /// Sent as bearer token to the GitHub API to lift the anonymous rate limit
    pub github_token: Option<String>,
    /// Catalog ids left out of the default catalog
    pub disabled_apps: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            global_max_age_days: DEFAULT_GLOBAL_MAX_AGE_DAYS,
            concurrency: DEFAULT_CONCURRENCY,
            transport: TransportConfig::default(),
            github_token: None,
            disabled_apps: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file; missing fields use defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportConfig {
    pub user_agent: String,
    pub timeout_ms: u64,
    pub proxy: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: FETCH_TIMEOUT_MS,
            proxy: None,
        }
    }
}

/// Returns the path to the data directory for release-resolver.
/// Uses $XDG_DATA_HOME/release-resolver if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/release-resolver,
/// or ./release-resolver if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("release-resolver.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("release-resolver")
}
