// ── Host accessory framework capabilities ──
//
// The smart-home host owns accessory persistence, the UUID-keyed
// registry, and the characteristic object graph. Core only ever talks
// to it through these two traits; adapters implement them.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{SatelliteStatus, StaticMetadata};

/// Callback the host invokes when it wants a fresh status on demand.
pub type StatusReader = Arc<dyn Fn() -> BoxFuture<'static, SatelliteStatus> + Send + Sync>;

/// One accessory as exposed by the host framework.
///
/// Handles are cheap to clone and all clones refer to the same accessory.
pub trait AccessoryHandle: Clone + Send + Sync + 'static {
    fn uuid(&self) -> Uuid;

    fn display_name(&self) -> String;

    /// Overwrite manufacturer, model, serial, and firmware revision.
    fn set_static_metadata(&self, metadata: &StaticMetadata);

    /// Push path: publish the latest polled status.
    fn set_status(&self, status: SatelliteStatus);

    /// Install the on-demand read path, replacing any previous reader.
    fn on_status_requested(&self, reader: StatusReader);
}

/// Registry side of the host framework.
pub trait AccessoryHost: Send + Sync + 'static {
    type Handle: AccessoryHandle;

    /// Deterministic UUID for an identity-key seed.
    fn generate_identity(&self, seed: &str) -> Uuid;

    /// Every accessory that survived the last restart.
    fn cached_accessories(&self) -> Vec<Self::Handle>;

    fn lookup_cached_accessory(&self, uuid: &Uuid) -> Option<Self::Handle> {
        self.cached_accessories()
            .into_iter()
            .find(|handle| handle.uuid() == *uuid)
    }

    fn create_accessory(&self, name: &str, uuid: Uuid) -> Self::Handle;

    /// Register newly created accessories in one batch.
    fn register_accessories(&self, handles: &[Self::Handle]) -> Result<(), CoreError>;

    /// Unregister stale accessories in one batch.
    fn unregister_accessories(&self, handles: &[Self::Handle]) -> Result<(), CoreError>;
}
