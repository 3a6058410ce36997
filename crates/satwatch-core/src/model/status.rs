use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use satwatch_api::ProbeResponse;

use super::identity::IdentityKey;

/// Two-valued reachability signal reported per device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SatelliteStatus {
    Connected,
    NotConnected,
}

impl SatelliteStatus {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl From<ProbeResponse> for SatelliteStatus {
    fn from(response: ProbeResponse) -> Self {
        if response.is_up() {
            Self::Connected
        } else {
            Self::NotConnected
        }
    }
}

/// Latest observation for one device, published on every poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    /// `None` until the first poll resolves.
    pub status: Option<SatelliteStatus>,
    pub last_checked: Option<DateTime<Utc>>,
    /// Why the last poll degraded to NotConnected, if it did.
    pub last_error: Option<String>,
    pub polls: u64,
}

/// Flattened per-device view for listings.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatusView {
    pub name: String,
    pub key: IdentityKey,
    pub homepage_url: String,
    pub interval_ms: i64,
    #[serde(flatten)]
    pub snapshot: DeviceSnapshot,
}
