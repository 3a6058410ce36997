//! Configuration for satwatch.
//!
//! A TOML (or JSON) file plus `SATWATCH_`-prefixed environment variables,
//! layered with figment and translated into `satwatch_core::DeviceConfig`s
//! and probe transport settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use satwatch_core::{DeviceConfig, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config structs ──────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    /// Routers to watch, in registration order.
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProbeSettings {
    /// Per-probe timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}
fn default_user_agent() -> String {
    TransportConfig::default().user_agent
}

impl ProbeSettings {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Accessory cache file. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// One `[[devices]]` entry, in the inbound camelCase schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub homepage_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware_revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_interval: Option<RawInterval>,
}

/// `pollingInterval` as written: usually a string, but bare integers
/// (and environment overrides, which figment parses) are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawInterval {
    Integer(i64),
    Text(String),
}

impl RawInterval {
    /// String form handed to the core, which owns parsing and defaults.
    pub fn as_config_string(&self) -> String {
        match self {
            Self::Integer(ms) => ms.to_string(),
            Self::Text(raw) => raw.clone(),
        }
    }
}

impl From<&DeviceEntry> for DeviceConfig {
    fn from(entry: &DeviceEntry) -> Self {
        DeviceConfig {
            name: entry.name.clone(),
            homepage_url: entry.homepage_url.clone(),
            manufacturer: entry.manufacturer.clone(),
            model: entry.model.clone(),
            serial: entry.serial.clone(),
            firmware_revision: entry.firmware_revision.clone(),
            polling_interval: entry
                .polling_interval
                .as_ref()
                .map(RawInterval::as_config_string),
        }
    }
}

impl Config {
    /// Reject entries the core cannot identify.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.timeout_ms == 0 {
            return Err(ConfigError::Validation {
                field: "probe.timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        for (index, device) in self.devices.iter().enumerate() {
            if device.name.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("devices[{index}].name"),
                    reason: "must not be empty".into(),
                });
            }
            // Whitespace-only addresses pass here and fail normalization per device.
            if device.homepage_url.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("devices[{index}].homepageUrl"),
                    reason: format!("must not be empty (device '{}')", device.name),
                });
            }
        }
        Ok(())
    }

    pub fn device_configs(&self) -> Vec<DeviceConfig> {
        self.devices.iter().map(DeviceConfig::from).collect()
    }

    /// Configured cache path, or the platform default.
    pub fn cache_path(&self) -> PathBuf {
        self.cache.path.clone().unwrap_or_else(default_cache_path)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "satwatch", "satwatch")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("satwatch");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

pub fn default_cache_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("accessories.json"),
        |dirs| dirs.data_dir().join("accessories.json"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Build the provider stack for `path` without extracting.
pub fn figment(path: &Path) -> Figment {
    let base = Figment::new().merge(Serialized::defaults(Config::default()));
    let with_file = if path.extension().is_some_and(|ext| ext == "json") {
        base.merge(Json::file(path))
    } else {
        base.merge(Toml::file(path))
    };
    with_file.merge(Env::prefixed("SATWATCH_").split("__"))
}

/// Load and validate configuration.
///
/// An explicit `path` must exist. The default location may be absent,
/// in which case defaults and environment apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let resolved = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file not found: {}", p.display()),
                )));
            }
            p.to_path_buf()
        }
        None => config_path(),
    };

    let config: Config = figment(&resolved).extract()?;
    config.validate()?;
    Ok(config)
}
