//! Configuration management for casetrack.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "casetrack";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "casetrack.db";

/// Default local key-value store file name.
const REPORTS_FILE_NAME: &str = "local-storage.json";

/// Longest accepted session lifetime: ten years.
pub const MAX_SESSION_TTL_HOURS: u32 = 24 * 365 * 10;

/// Longest accepted audit retention window: one hundred years.
pub const MAX_AUDIT_RETENTION_DAYS: u32 = 365 * 100;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CASETRACK_`, sections separated by `__`)
/// 2. TOML config file at `~/.config/casetrack/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server listens on.
    pub bind_address: String,
    /// Value of the `Access-Control-Allow-Origin` header.
    pub cors_allow_origin: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/casetrack/casetrack.db`
    pub database_path: Option<PathBuf>,
    /// Path to the local key-value store holding saved reports.
    /// Defaults to `~/.local/share/casetrack/local-storage.json`
    pub reports_path: Option<PathBuf>,
    /// Maximum age of audit log entries in days.
    /// Set to 0 to keep everything.
    pub audit_retention_days: u32,
}

/// Authentication configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Privileged key authorizing user administration.
    /// User creation is unavailable while unset.
    pub service_key: Option<String>,
    /// Lifetime of a sign-in session in hours.
    pub session_ttl_hours: u32,
    /// Minimum accepted password length.
    pub min_password_length: usize,
}

impl AuthConfig {
    /// Get the session lifetime as a duration.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::hours(i64::from(self.session_ttl_hours))
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("service_key", &self.service_key.as_ref().map(|_| "<redacted>"))
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("min_password_length", &self.min_password_length)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            cors_allow_origin: "*".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Resolved to default at runtime
            reports_path: None,
            audit_retention_days: 0,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            service_key: None,
            session_ttl_hours: 24 * 7,
            min_password_length: 6,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `CASETRACK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(&config_file))
                .merge(Env::prefixed("CASETRACK_").split("__")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("invalid bind_address: {}", self.server.bind_address),
            });
        }

        if self.auth.session_ttl_hours == 0 {
            return Err(Error::ConfigValidation {
                message: "session_ttl_hours must be greater than 0".to_string(),
            });
        }

        if self.auth.session_ttl_hours > MAX_SESSION_TTL_HOURS {
            return Err(Error::ConfigValidation {
                message: format!("session_ttl_hours must be at most {MAX_SESSION_TTL_HOURS}"),
            });
        }

        if self.storage.audit_retention_days > MAX_AUDIT_RETENTION_DAYS {
            return Err(Error::ConfigValidation {
                message: format!("audit_retention_days must be at most {MAX_AUDIT_RETENTION_DAYS}"),
            });
        }

        if self.auth.min_password_length == 0 {
            return Err(Error::ConfigValidation {
                message: "min_password_length must be greater than 0".to_string(),
            });
        }

        if let Some(key) = &self.auth.service_key {
            if key.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "service_key must not be empty when set".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the bind address as a socket address.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address does not parse.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server
            .bind_address
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!("invalid bind_address: {}", self.server.bind_address),
            })
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the reports store path, resolving defaults if not set.
    #[must_use]
    pub fn reports_path(&self) -> PathBuf {
        self.storage
            .reports_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(REPORTS_FILE_NAME))
    }

    /// Get the audit retention window, if any.
    #[must_use]
    pub fn audit_retention(&self) -> Option<Duration> {
        if self.storage.audit_retention_days == 0 {
            None
        } else {
            Some(Duration::days(i64::from(self.storage.audit_retention_days)))
        }
    }
}
