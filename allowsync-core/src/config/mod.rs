//! Configuration management
//!
//! Configuration is an explicitly constructed value handed to each
//! component; nothing reads it through a global. Values come from
//! defaults, an optional TOML file, and an `ALLOWSYNC_*` environment
//! overlay, in that order.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shared database location
    pub database: DatabaseConfig,

    /// Host server directory
    pub server: ServerConfig,

    /// Reconciliation settings
    pub sync: SyncConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Shared database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file shared between server instances
    pub path: PathBuf,
}

/// Host server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Directory holding the host's `whitelist.json` / `ops.json`
    pub server_dir: PathBuf,
}

/// Reconciliation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Whether op-list syncing is enabled. When disabled, every op-list
    /// operation returns an empty result and logs an explanation
    /// instead of touching the store.
    pub sync_op_list: bool,

    /// Upper bound on concurrently running sync tasks
    pub max_concurrent_tasks: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./allowsync.db"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_dir: PathBuf::from("."),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            // Op syncing is opt-in; whitelist syncing is always on.
            sync_op_list: false,
            max_concurrent_tasks: 4,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_target: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables over defaults
    ///
    /// Environment variables follow the pattern: ALLOWSYNC_<SECTION>_<KEY>
    /// Example: ALLOWSYNC_DATABASE_PATH=/srv/shared/allowsync.db
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file, then overlay the environment.
    /// Environment values win over file values.
    pub fn load(file: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(path) = env::var("ALLOWSYNC_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var("ALLOWSYNC_SERVER_DIR") {
            self.server.server_dir = PathBuf::from(dir);
        }
        if let Ok(flag) = env::var("ALLOWSYNC_SYNC_OP_LIST") {
            self.sync.sync_op_list = flag
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid op sync flag: {}", e)))?;
        }
        if let Ok(tasks) = env::var("ALLOWSYNC_SYNC_MAX_CONCURRENT_TASKS") {
            self.sync.max_concurrent_tasks = tasks.parse().map_err(|e| {
                ConfigError::InvalidValue(format!("Invalid max concurrent tasks: {}", e))
            })?;
        }
        if let Ok(level) = env::var("ALLOWSYNC_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json) = env::var("ALLOWSYNC_LOG_JSON") {
            self.logging.json_format = json
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid JSON flag: {}", e)))?;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.max_concurrent_tasks == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_concurrent_tasks must be greater than 0".to_string(),
            ));
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "database path must not be empty".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWriteError(e.to_string()))?;

        Ok(())
    }
}
