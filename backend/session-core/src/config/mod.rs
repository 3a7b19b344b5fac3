pub mod endpoint;

pub use endpoint::gateway_endpoint;

use crate::error::config::ConfigError;
use crate::reconnect::BackoffPolicy;
use crate::{DEFAULT_GATEWAY_ORIGIN, DEFAULT_GATEWAY_PATH};

use common::ErrorLocation;
use models::Channel;

use std::collections::BTreeSet;
use std::env;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE_NAME: &str = "session.json";

pub const ENV_GATEWAY_ORIGIN: &str = "STREAM_GATEWAY_ORIGIN";
pub const ENV_AUTO_RECONNECT: &str = "STREAM_AUTO_RECONNECT";
pub const ENV_MAX_RECONNECT_ATTEMPTS: &str = "STREAM_MAX_RECONNECT_ATTEMPTS";
pub const ENV_HEARTBEAT_INTERVAL_MS: &str = "STREAM_HEARTBEAT_INTERVAL_MS";

// ============================================
// CONFIG STRUCT
// ============================================

/// Options recognized by a session.
///
/// Every field has a default, so a partial `session.json` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_gateway_origin")]
    pub gateway_origin: String,

    #[serde(default = "default_gateway_path")]
    pub gateway_path: String,

    /// Initial desired channel set.
    #[serde(default)]
    pub channels: BTreeSet<Channel>,

    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,

    /// Base delay before the first reconnect attempt.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Upper bound for the grown reconnect delay.
    #[serde(default = "default_max_reconnect_delay_ms")]
    pub max_reconnect_delay_ms: u64,

    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gateway_origin: default_gateway_origin(),
            gateway_path: default_gateway_path(),
            channels: BTreeSet::new(),
            auto_reconnect: default_auto_reconnect(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_delay_ms: default_max_reconnect_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_gateway_origin() -> String {
    DEFAULT_GATEWAY_ORIGIN.to_string()
}
fn default_gateway_path() -> String {
    DEFAULT_GATEWAY_PATH.to_string()
}
fn default_auto_reconnect() -> bool {
    true
}
fn default_reconnect_delay_ms() -> u64 {
    3_000
}
fn default_max_reconnect_delay_ms() -> u64 {
    30_000
}
fn default_max_reconnect_attempts() -> u32 {
    10
}
fn default_heartbeat_interval_ms() -> u64 {
    25_000
}

// ============================================
// IMPLEMENTATION
// ============================================

impl SessionConfig {
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.gateway_origin = origin.into();
        self
    }

    pub fn with_channels(mut self, channels: impl IntoIterator<Item = Channel>) -> Self {
        self.channels = channels.into_iter().collect();
        self
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn max_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_delay_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.reconnect_delay(), self.max_reconnect_delay())
    }

    /// Streaming endpoint derived from `gateway_origin` and `gateway_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EndpointError`] for an unusable origin.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        gateway_endpoint(&self.gateway_origin, &self.gateway_path)
    }

    /// Load config from {config_dir}/session.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(SessionConfig)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Session config not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read session config: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: SessionConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse session config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Session config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/session.json using temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation, serialization,
    /// write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<PathBuf, ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Session config saved to {}", config_path.display());
        Ok(config_path)
    }

    /// Override fields from `STREAM_*` environment variables, then re-validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if a variable is set but does
    /// not parse, or the result fails validation.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(origin) = read_env(ENV_GATEWAY_ORIGIN) {
            debug!("{ENV_GATEWAY_ORIGIN} overrides gateway origin");
            self.gateway_origin = origin;
        }
        if let Some(value) = read_env(ENV_AUTO_RECONNECT) {
            self.auto_reconnect = parse_env(ENV_AUTO_RECONNECT, &value)?;
        }
        if let Some(value) = read_env(ENV_MAX_RECONNECT_ATTEMPTS) {
            self.max_reconnect_attempts = parse_env(ENV_MAX_RECONNECT_ATTEMPTS, &value)?;
        }
        if let Some(value) = read_env(ENV_HEARTBEAT_INTERVAL_MS) {
            self.heartbeat_interval_ms = parse_env(ENV_HEARTBEAT_INTERVAL_MS, &value)?;
        }

        self.validate()
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid, or
    /// [`ConfigError::EndpointError`] if the origin is unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat_interval_ms == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "heartbeat_interval_ms must be greater than 0".to_string(),
            });
        }

        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "reconnect_delay_ms must be greater than 0".to_string(),
            });
        }

        if self.reconnect_delay_ms > self.max_reconnect_delay_ms {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "reconnect_delay_ms ({}) exceeds max_reconnect_delay_ms ({})",
                    self.reconnect_delay_ms, self.max_reconnect_delay_ms
                ),
            });
        }

        if !self.gateway_path.starts_with('/') {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("gateway_path must start with '/': {}", self.gateway_path),
            });
        }

        self.endpoint()?;

        Ok(())
    }
}

/// Load `.env` from the working directory if present.
///
/// Returns the path that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            info!("Loaded .env from: {:?}", path);
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            warn!("Failed to parse .env: {}", e);
            None
        }
    }
}

fn read_env(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Ok(_) => None,
        Err(env::VarError::NotPresent) => None,
        Err(env::VarError::NotUnicode(_)) => {
            warn!("Env var {key} contains invalid unicode, ignoring");
            None
        }
    }
}

#[track_caller]
fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let location = ErrorLocation::from(Location::caller());
    value.parse::<T>().map_err(|e| ConfigError::ValidationError {
        location,
        reason: format!("{key}={value}: {e}"),
    })
}
