//! Polling and state reconciliation for router "satellite" status.
//!
//! This crate owns everything between configuration and the host
//! accessory framework:
//!
//! - **[`Platform`]**: facade over a host adapter and a prober.
//!   [`sync()`](Platform::sync) reconciles the configured devices with the
//!   host's accessories and (re)starts timers;
//!   [`shutdown()`](Platform::shutdown) tears every timer down.
//!
//! - **[`PollScheduler`]**: one independent repeating timer per
//!   [`IdentityKey`]. Each tick spawns its own probe, degrades failures to
//!   [`SatelliteStatus::NotConnected`], and writes back only while the
//!   device is still scheduled.
//!
//! - **[`reconcile()`]**: pure keep / add / remove diff over identities.
//!
//! - **Host capabilities** ([`AccessoryHost`], [`AccessoryHandle`]): the
//!   only surface through which the host framework is touched.

pub mod error;
pub mod host;
pub mod model;
pub mod platform;
pub mod probe;
pub mod reconcile;
pub mod scheduler;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use host::{AccessoryHandle, AccessoryHost, StatusReader};
pub use model::{
    DEFAULT_POLLING_INTERVAL_MS, DeviceConfig, DeviceSnapshot, DeviceStatusView, IdentityKey,
    SatelliteStatus, StaticMetadata,
};
pub use platform::{Platform, SyncReport};
pub use probe::{Prober, probe_address, resolve_status};
pub use reconcile::{PlannedDevice, Reconciliation, reconcile};
pub use scheduler::{PollScheduler, ScheduleState};

pub use satwatch_api::{HttpProber, NormalizedOrigin, ProbeErrorKind, TransportConfig, normalize};
