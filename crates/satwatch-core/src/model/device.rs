use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::identity::IdentityKey;

/// Period used when `pollingInterval` is absent or not an integer.
pub const DEFAULT_POLLING_INTERVAL_MS: i64 = 5000;

const DEFAULT_MANUFACTURER: &str = "Default-Manufacturer";
const DEFAULT_MODEL: &str = "Default-Model";
const DEFAULT_SERIAL: &str = "Default-Serial";
const DEFAULT_FIRMWARE_REVISION: &str = "1.0.0";

/// A router the user asked satwatch to watch.
///
/// Field names follow the inbound configuration schema (camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    pub name: String,
    pub homepage_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware_revision: Option<String>,
    /// Milliseconds between polls, in string form as configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_interval: Option<String>,
}

impl DeviceConfig {
    pub fn new(name: impl Into<String>, homepage_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            homepage_url: homepage_url.into(),
            manufacturer: None,
            model: None,
            serial: None,
            firmware_revision: None,
            polling_interval: None,
        }
    }

    pub fn with_polling_interval(mut self, interval: impl Into<String>) -> Self {
        self.polling_interval = Some(interval.into());
        self
    }

    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::for_homepage_url(&self.homepage_url)
    }

    /// The configured interval, or [`DEFAULT_POLLING_INTERVAL_MS`] when
    /// absent or unparseable. Zero and negative values pass through.
    pub fn polling_interval_ms(&self) -> i64 {
        self.polling_interval
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_POLLING_INTERVAL_MS)
    }

    /// Timer period for this device. A tokio interval cannot tick at zero,
    /// so non-positive values are floored to one millisecond.
    pub fn polling_period(&self) -> Duration {
        u64::try_from(self.polling_interval_ms())
            .ok()
            .filter(|ms| *ms > 0)
            .map_or(Duration::from_millis(1), Duration::from_millis)
    }

    /// Metadata pushed to the accessory, with defaults filled in.
    pub fn static_metadata(&self) -> StaticMetadata {
        StaticMetadata {
            manufacturer: self
                .manufacturer
                .clone()
                .unwrap_or_else(|| DEFAULT_MANUFACTURER.into()),
            model: self.model.clone().unwrap_or_else(|| DEFAULT_MODEL.into()),
            serial: self.serial.clone().unwrap_or_else(|| DEFAULT_SERIAL.into()),
            firmware_revision: self
                .firmware_revision
                .clone()
                .unwrap_or_else(|| DEFAULT_FIRMWARE_REVISION.into()),
        }
    }
}

/// Accessory information re-applied on every reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticMetadata {
    pub manufacturer: String,
    pub model: String,
    pub serial: String,
    pub firmware_revision: String,
}
