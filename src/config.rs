//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `SMARTCARE_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::insights::InsightSettings;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub insights: InsightSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `smartcare.db`
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("smartcare").to_string_lossy().to_string())
        .unwrap_or_else(|| "./smartcare_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
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

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
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

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Defaults plus environment variable overrides
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

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("smartcare").join("config.toml")),
            Some(PathBuf::from("/etc/smartcare/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `SMARTCARE_*` overrides read through `lookup`.
    ///
    /// Values that fail to parse are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = lookup("SMARTCARE_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        if let Some(host) = lookup("SMARTCARE_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("SMARTCARE_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        if let Some(ttl) = lookup("SMARTCARE_CACHE_TTL_SECS").and_then(|t| t.parse().ok()) {
            self.insights.cache_ttl_secs = ttl;
        }

        if let Some(level) = lookup("SMARTCARE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("SMARTCARE_LOG_FORMAT") {
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
    r#"# SmartCare Configuration
#
# Environment variables override these settings:
# - SMARTCARE_DATA_DIR
# - SMARTCARE_API_HOST
# - SMARTCARE_API_PORT
# - SMARTCARE_CACHE_TTL_SECS
# - SMARTCARE_LOG_LEVEL
# - SMARTCARE_LOG_FORMAT

[storage]
# Directory holding smartcare.db
data_dir = "~/.local/share/smartcare"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins (empty allows any origin)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

# Maximum request body size in bytes
max_body_size = 1048576

[insights]
# How long a computed snapshot is served from cache (seconds)
cache_ttl_secs = 300

# How often expired cache rows are deleted (seconds)
sweep_interval_secs = 60

[insights.limits]
# Most recent events of each kind read per computation
feeding = 20
sleep = 15
growth = 10

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.api.port, defaults.api.port);
        assert_eq!(config.api.max_body_size, defaults.api.max_body_size);
        assert_eq!(config.insights, defaults.insights);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::parse(
            r#"
            [insights.limits]
            feeding = 5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.insights.limits.feeding, 5);
        assert_eq!(config.insights.limits.sleep, 15);
        assert_eq!(config.insights.cache_ttl_secs, 300);
        assert_eq!(config.api.port, 8090);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nport = \"not a number\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: p, .. } if p == path));

        let missing = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SMARTCARE_DATA_DIR", "/tmp/smartcare"),
            ("SMARTCARE_API_PORT", "9000"),
            ("SMARTCARE_CACHE_TTL_SECS", "soon"),
            ("SMARTCARE_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/tmp/smartcare");
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.insights.cache_ttl_secs, 300);
        assert!(config.logging.is_json());
        assert_eq!(config.api.host, "0.0.0.0");
    }

    #[test]
    fn test_data_path_expands_home() {
        let storage = StorageConfig {
            data_dir: "/var/lib/smartcare".to_string(),
        };
        assert_eq!(storage.data_path(), PathBuf::from("/var/lib/smartcare"));

        let storage = StorageConfig {
            data_dir: "~/smartcare".to_string(),
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(storage.data_path(), home.join("smartcare"));
        }
    }
}
