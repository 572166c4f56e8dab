//! Runtime configuration: defaults, then environment, then caller overrides.
//!
//! # Invariants
//! - `validate` must pass before a config is used to open stores, start
//!   logging or build a gateway.
//! - The resolved log directory is always absolute.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DATA_DIR: &str = "HOMEBASE_DATA_DIR";
pub const ENV_STORE: &str = "HOMEBASE_STORE";
pub const ENV_LOG_LEVEL: &str = "HOMEBASE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "HOMEBASE_LOG_DIR";
pub const ENV_LLM_ENDPOINT: &str = "HOMEBASE_LLM_ENDPOINT";
pub const ENV_LLM_MODEL: &str = "HOMEBASE_LLM_MODEL";
pub const ENV_LLM_TIMEOUT_SECS: &str = "HOMEBASE_LLM_TIMEOUT_SECS";

const DEFAULT_DATA_DIR: &str = "data";
const SQLITE_FILE_NAME: &str = "homebase.sqlite3";
const DEFAULT_LLM_ENDPOINT: &str = "http://localhost:11434/api/generate";
const DEFAULT_LLM_MODEL: &str = "mistral";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 20;

#[derive(Debug)]
pub enum ConfigError {
    EmptyValue(&'static str),
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    CurrentDir(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue(key) => write!(f, "{key} cannot be empty"),
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key} `{value}`: {reason}")
            }
            Self::CurrentDir(err) => write!(f, "cannot resolve current directory: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CurrentDir(err) => Some(err),
            _ => None,
        }
    }
}

/// Persistence medium for the collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Json,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Json => "json",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "store_backend",
                value: value.to_string(),
                reason: "expected sqlite|json".to_string(),
            }),
        }
    }
}

/// Language model endpoint used for escalation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::EmptyValue("llm endpoint"));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "llm endpoint",
                value: endpoint.to_string(),
                reason: "expected an http(s) URL".to_string(),
            });
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyValue("llm model"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "llm timeout",
                value: "0".to_string(),
                reason: "must be at least one second".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub store_backend: StoreBackend,
    pub log_level: String,
    /// `None` means `<data_dir>/logs`.
    pub log_dir: Option<PathBuf>,
    pub gateway: GatewayConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            store_backend: StoreBackend::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
            gateway: GatewayConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `HOMEBASE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns per variable name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = lookup(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(value.trim());
        }
        if let Some(value) = lookup(ENV_STORE) {
            config.store_backend = StoreBackend::parse(&value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.log_level = value;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(value.trim()));
        }
        if let Some(value) = lookup(ENV_LLM_ENDPOINT) {
            config.gateway.endpoint = value.trim().to_string();
        }
        if let Some(value) = lookup(ENV_LLM_MODEL) {
            config.gateway.model = value.trim().to_string();
        }
        if let Some(value) = lookup(ENV_LLM_TIMEOUT_SECS) {
            config.gateway.timeout_secs =
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|err| ConfigError::InvalidValue {
                        key: "llm timeout",
                        value: value.clone(),
                        reason: err.to_string(),
                    })?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyValue("data_dir"));
        }
        if matches!(&self.log_dir, Some(dir) if dir.as_os_str().is_empty()) {
            return Err(ConfigError::EmptyValue("log_dir"));
        }
        normalize_level(&self.log_level).map_err(|reason| ConfigError::InvalidValue {
            key: "log_level",
            value: self.log_level.clone(),
            reason,
        })?;
        self.gateway.validate()
    }

    /// SQLite database file under `data_dir`.
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join(SQLITE_FILE_NAME)
    }

    /// Absolute log directory.
    pub fn resolved_log_dir(&self) -> Result<PathBuf, ConfigError> {
        let dir = self
            .log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("logs"));
        absolutize(&dir)
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
    Ok(cwd.join(path))
}
