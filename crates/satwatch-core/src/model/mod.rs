// ── Domain model ──
//
// Configured devices, their identity keys, and the two-valued status
// each one reports.

pub mod device;
pub mod identity;
pub mod status;

pub use device::{DEFAULT_POLLING_INTERVAL_MS, DeviceConfig, StaticMetadata};
pub use identity::IdentityKey;
pub use status::{DeviceSnapshot, DeviceStatusView, SatelliteStatus};
