//! Configuration loading and backend credential resolution
//!
//! Bootstrap configuration lives in a TOML file
//! (`~/.config/atelier/atelier.toml` by default). A missing file is not an
//! error: the site starts with defaults and the data layer fails closed until
//! credentials are provided.
//!
//! Backend credentials resolve in priority order:
//! 1. Environment (`AIRTABLE_API_KEY`, `AIRTABLE_BASE_ID`)
//! 2. TOML `[airtable]` section

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const API_KEY_ENV: &str = "AIRTABLE_API_KEY";
pub const BASE_ID_ENV: &str = "AIRTABLE_BASE_ID";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub airtable: AirtableConfig,

    #[serde(default)]
    pub data: DataConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirtableConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_id: Option<String>,

    /// REST endpoint root, overridable for testing
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_id: None,
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// How a bulk fetch treats records that fail validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Drop only the failing records and keep the rest
    #[default]
    Partial,
    /// Any failing record empties the whole batch
    AllOrNothing,
}

/// Data access behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub batch_policy: BatchPolicy,

    /// Accept legacy service-to-artist field names when `Artist ID` is absent
    #[serde(default = "default_true")]
    pub legacy_relation_fields: bool,

    /// Substitute sample data when the backend yields nothing
    #[serde(default = "default_true")]
    pub fallback_data: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            batch_policy: BatchPolicy::default(),
            legacy_relation_fields: true,
            fallback_data: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_url() -> String {
    "https://api.airtable.com/v0".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Default config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("atelier").join("atelier.toml"))
}

/// Load TOML configuration, falling back to defaults when the file is missing
///
/// A file that exists but cannot be parsed is an error; silently ignoring it
/// would hide typos in credentials.
///
/// Emits no log events: it runs before the subscriber exists (the log level
/// comes from this file), so the caller reports the outcome once logging is up.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))
}

/// Write TOML configuration atomically (temp file + rename)
///
/// On Unix the file is restricted to `0600` since it may hold the API key.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    std::fs::write(&temp_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// Backend credentials
#[derive(Clone, PartialEq, Eq)]
pub struct BackendCredentials {
    pub api_key: String,
    pub base_id: String,
}

impl std::fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendCredentials")
            .field("api_key", &"<redacted>")
            .field("base_id", &self.base_id)
            .finish()
    }
}

/// Resolve backend credentials (ENV → TOML)
///
/// Each value resolves independently, so the key may come from the
/// environment while the base id comes from TOML.
pub fn resolve_credentials(toml_config: &TomlConfig) -> Result<BackendCredentials> {
    let api_key = resolve_value(
        "API key",
        API_KEY_ENV,
        toml_config.airtable.api_key.as_deref(),
    );
    let base_id = resolve_value(
        "base id",
        BASE_ID_ENV,
        toml_config.airtable.base_id.as_deref(),
    );

    match (api_key, base_id) {
        (Some(api_key), Some(base_id)) => Ok(BackendCredentials { api_key, base_id }),
        (api_key, base_id) => {
            let mut missing = Vec::new();
            if api_key.is_none() {
                missing.push(API_KEY_ENV);
            }
            if base_id.is_none() {
                missing.push(BASE_ID_ENV);
            }
            Err(Error::Config(format!(
                "Backend credentials not configured (missing {}). Set the environment \
                 variables or the [airtable] api_key / base_id entries in the TOML config",
                missing.join(", ")
            )))
        }
    }
}

fn resolve_value(label: &str, env_name: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_name).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "Backend {} found in both environment and TOML. Using environment (highest priority).",
            label
        );
    }

    if let Some(value) = env_value {
        info!("Backend {} loaded from environment variable", label);
        return Some(value);
    }

    if let Some(value) = toml_value {
        info!("Backend {} loaded from TOML config", label);
        return Some(value.to_string());
    }

    None
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
