// ── Platform facade ──
//
// Ties the host registry, the reconciler, and the poll scheduler
// together. `sync` is the only place the host registry is mutated.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::host::{AccessoryHandle, AccessoryHost};
use crate::model::{DeviceConfig, DeviceStatusView, IdentityKey, SatelliteStatus};
use crate::probe::Prober;
use crate::reconcile::{Reconciliation, reconcile};
use crate::scheduler::PollScheduler;

/// Counts from one [`Platform::sync`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub kept: usize,
    pub added: usize,
    pub removed: usize,
}

/// The main entry point for hosts.
///
/// Cheaply cloneable via `Arc<PlatformInner>`.
pub struct Platform<H: AccessoryHost, P> {
    inner: Arc<PlatformInner<H, P>>,
}

impl<H: AccessoryHost, P> Clone for Platform<H, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct PlatformInner<H: AccessoryHost, P> {
    host: H,
    scheduler: PollScheduler<P, H::Handle>,
}

impl<H: AccessoryHost, P: Prober> Platform<H, P> {
    pub fn new(host: H, prober: P) -> Self {
        Self {
            inner: Arc::new(PlatformInner {
                host,
                scheduler: PollScheduler::new(Arc::new(prober)),
            }),
        }
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn scheduler(&self) -> &PollScheduler<P, H::Handle> {
        &self.inner.scheduler
    }

    /// UUID the host assigns to `key`.
    pub fn identity(&self, key: &IdentityKey) -> Uuid {
        self.inner.host.generate_identity(key.as_str())
    }

    // ── Reconciliation ───────────────────────────────────────────

    /// Bring the host registry and the timers in line with `configured`.
    ///
    /// Known accessories are the host's cache plus every live entry.
    /// New accessories are registered in one batch, stale ones
    /// unregistered in one batch. Registration failures are logged and
    /// not retried. Must run inside a tokio runtime.
    pub fn sync(&self, configured: &[DeviceConfig]) -> SyncReport {
        let host = &self.inner.host;
        let scheduler = &self.inner.scheduler;

        let mut known: HashMap<Uuid, H::Handle> = host
            .cached_accessories()
            .into_iter()
            .map(|handle| (handle.uuid(), handle))
            .collect();
        known.extend(scheduler.handles());

        let plan = reconcile(configured, &known, |key| self.identity(key));
        let report = SyncReport {
            kept: plan.keep.len(),
            added: plan.add.len(),
            removed: plan.remove.len(),
        };
        self.apply(plan);

        info!(
            kept = report.kept,
            added = report.added,
            removed = report.removed,
            "device registry reconciled"
        );
        report
    }

    fn apply(&self, plan: Reconciliation<H::Handle>) {
        let host = &self.inner.host;
        let scheduler = &self.inner.scheduler;

        for (planned, handle) in plan.keep {
            debug!(device = %planned.device.name, key = %planned.key, "keeping accessory");
            handle.set_static_metadata(&planned.device.static_metadata());
            scheduler.schedule(planned.key, planned.uuid, planned.device, handle);
        }

        let added: Vec<_> = plan
            .add
            .into_iter()
            .map(|planned| {
                debug!(device = %planned.device.name, key = %planned.key, "adding accessory");
                let handle = host.create_accessory(&planned.device.name, planned.uuid);
                handle.set_static_metadata(&planned.device.static_metadata());
                (planned, handle)
            })
            .collect();
        if !added.is_empty() {
            let handles: Vec<H::Handle> = added.iter().map(|(_, h)| h.clone()).collect();
            if let Err(e) = host.register_accessories(&handles) {
                warn!(error = %e, count = handles.len(), "registering accessories failed");
            }
        }
        for (planned, handle) in added {
            scheduler.schedule(planned.key, planned.uuid, planned.device, handle);
        }

        if !plan.remove.is_empty() {
            let handles: Vec<H::Handle> = plan
                .remove
                .into_iter()
                .map(|(uuid, handle)| {
                    match scheduler.cancel_uuid(&uuid) {
                        Some((key, _)) => debug!(%key, "removing accessory"),
                        None => debug!(%uuid, name = %handle.display_name(), "removing cached accessory"),
                    }
                    handle
                })
                .collect();
            if let Err(e) = host.unregister_accessories(&handles) {
                warn!(error = %e, count = handles.len(), "unregistering accessories failed");
            }
        }
    }

    // ── Status access ────────────────────────────────────────────

    /// On-demand read for one device, independent of its timer.
    pub async fn refresh(&self, key: &IdentityKey) -> Option<SatelliteStatus> {
        self.inner.scheduler.read_now(key).await
    }

    pub fn statuses(&self) -> Vec<DeviceStatusView> {
        self.inner.scheduler.views()
    }

    /// Stop every timer. The platform polls nothing afterwards.
    pub async fn shutdown(&self) {
        self.inner.scheduler.shutdown().await;
        info!("platform shut down");
    }
}
