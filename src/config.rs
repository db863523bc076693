//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::chart::{Metric, Scale};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// CSV location: an http(s) URL, a `file://` URL or a plain path
    #[serde(default = "default_feed_url")]
    pub url: String,

    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,

    /// Extra attempts after a failed fetch; 0 fails on the first error
    #[serde(default)]
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each further retry
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_feed_url() -> String {
    "http://covidtracking.com/api/states/daily.csv".to_string()
}

fn default_feed_timeout() -> u64 {
    30
}

fn default_retry_backoff() -> u64 {
    1000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout_secs: default_feed_timeout(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum concurrent dashboard sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Enable the derived-table CSV export endpoint
    #[serde(default = "default_enable_export")]
    pub enable_export: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_max_sessions() -> usize {
    1000
}

fn default_enable_export() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            max_sessions: default_max_sessions(),
            enable_export: default_enable_export(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Dashboard page and control defaults
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,

    /// States selected when the line chart tab is mounted
    #[serde(default = "default_states")]
    pub default_states: Vec<String>,

    #[serde(default = "default_metric")]
    pub default_metric: Metric,

    #[serde(default)]
    pub default_scale: Scale,
}

fn default_title() -> String {
    "COVID-19 statistics from covidtracking.com".to_string()
}

fn default_states() -> Vec<String> {
    vec!["MD".to_string()]
}

fn default_metric() -> Metric {
    Metric::Positive
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            default_states: default_states(),
            default_metric: default_metric(),
            default_scale: Scale::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "covid_dash=info,tower_http=info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Whether JSON log lines were requested
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Find the config file to use
    ///
    /// `COVID_DASH_CONFIG` wins, then the per-user config directory,
    /// `/etc/covid-dash/config.toml` and `./config.toml`.
    pub fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("COVID_DASH_CONFIG") {
            return Some(PathBuf::from(path));
        }

        let config_paths = [
            dirs::config_dir().map(|p| p.join("covid-dash").join("config.toml")),
            Some(PathBuf::from("/etc/covid-dash/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        config_paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Feed overrides
        if let Ok(url) = std::env::var("COVID_DASH_FEED_URL") {
            self.feed.url = url;
        }

        // API overrides
        if let Ok(host) = std::env::var("COVID_DASH_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("COVID_DASH_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("COVID_DASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("COVID_DASH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# covid-dash Configuration
#
# Environment variables override these settings:
# - COVID_DASH_CONFIG (path of this file)
# - COVID_DASH_FEED_URL
# - COVID_DASH_API_HOST
# - COVID_DASH_API_PORT
# - COVID_DASH_LOG_LEVEL
# - COVID_DASH_LOG_FORMAT

[feed]
# State daily CSV: http(s) URL, file:// URL or local path
url = "http://covidtracking.com/api/states/daily.csv"

# Request timeout in seconds
timeout_secs = 30

# Retries after a failed fetch (0 = fail at startup on the first error)
max_retries = 0

# Delay before the first retry, doubled each time (ms)
retry_backoff_ms = 1000

[api]
# Server host
host = "0.0.0.0"

# Server port
port = 8050

# Allowed CORS origins (empty = any)
cors_origins = []

# Maximum concurrent dashboard sessions
max_sessions = 1000

# Enable GET /api/v1/export
enable_export = true

[dashboard]
# Page heading
title = "COVID-19 statistics from covidtracking.com"

# Line chart defaults, applied whenever the tab is mounted
default_states = ["MD"]

# positive, totalTestResults, perc_increase, perc_five_increase, perc_death, perc_hosp
default_metric = "positive"

# linear or log
default_scale = "linear"

[logging]
# Filter directives: trace, debug, info, warn, error (per target allowed)
level = "covid_dash=info,tower_http=info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_round_trips() {
        let config = Config::from_toml(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.feed.url, defaults.feed.url);
        assert_eq!(config.feed.max_retries, 0);
        assert_eq!(config.api.port, defaults.api.port);
        assert_eq!(config.dashboard.default_states, vec!["MD"]);
        assert_eq!(config.dashboard.default_metric, Metric::Positive);
        assert_eq!(config.dashboard.default_scale, Scale::Linear);
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
[dashboard]
default_states = ["NY", "NJ"]
default_metric = "perc_five_increase"
default_scale = "log"
"#,
        )
        .unwrap();

        assert_eq!(config.dashboard.default_metric, Metric::PercFiveIncrease);
        assert_eq!(config.dashboard.default_scale, Scale::Log);
        assert_eq!(config.api.addr(), "0.0.0.0:8050");
        assert_eq!(config.feed.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_metric_rejected() {
        let err = Config::from_toml("[dashboard]\ndefault_metric = \"negative\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nport = 9000\n\n[logging]\nformat = \"json\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.port, 9000);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("COVID_DASH_FEED_URL", "/data/daily.csv");
        std::env::set_var("COVID_DASH_API_PORT", "9100");
        std::env::set_var("COVID_DASH_LOG_FORMAT", "json");

        let config = Config::from_env();

        std::env::remove_var("COVID_DASH_FEED_URL");
        std::env::remove_var("COVID_DASH_API_PORT");
        std::env::remove_var("COVID_DASH_LOG_FORMAT");

        assert_eq!(config.feed.url, "/data/daily.csv");
        assert_eq!(config.api.port, 9100);
        assert!(config.logging.is_json());
        assert_eq!(config.api.host, "0.0.0.0");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/covid-dash.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
