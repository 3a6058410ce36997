// ── Poll scheduler ──
//
// One repeating timer per identity key. Each tick spawns its own probe
// task so a hung device never delays another device's timer, and every
// result is written back only while the owning entry is still live.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::host::{AccessoryHandle, StatusReader};
use crate::model::{
    DeviceConfig, DeviceSnapshot, DeviceStatusView, IdentityKey, SatelliteStatus,
};
use crate::probe::{Prober, resolve_status};

/// Lifecycle of a device's timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ScheduleState {
    /// No timer exists for the key.
    Unscheduled,
    /// A timer is firing every polling period.
    Scheduled,
    /// The timer was cancelled and is being torn down.
    Cancelled,
}

// ── Per-device context ───────────────────────────────────────────

/// Everything a tick needs, shared between the timer task, in-flight
/// probe tasks, and the on-demand reader.
struct PollContext<P, H> {
    device: DeviceConfig,
    handle: H,
    prober: Arc<P>,
    snapshot: watch::Sender<DeviceSnapshot>,
    cancel: CancellationToken,
}

impl<P: Prober, H: AccessoryHandle> PollContext<P, H> {
    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    async fn probe(&self) -> (SatelliteStatus, Option<CoreError>) {
        resolve_status(
            self.prober.as_ref(),
            &self.device.name,
            &self.device.homepage_url,
        )
        .await
    }

    /// Scheduled tick: probe, record, push to the accessory.
    async fn tick(&self) {
        let (status, error) = self.probe().await;
        if self.record(status, error) {
            self.handle.set_status(status);
        }
    }

    /// On-demand read: probe now and hand the result straight back.
    async fn read_now(&self) -> SatelliteStatus {
        let (status, error) = self.probe().await;
        self.record(status, error);
        status
    }

    /// Store a poll result. Returns `false` when the device was removed
    /// while the probe was in flight; the result is dropped.
    ///
    /// Overlapping probes for one device are possible when a probe
    /// outlasts the period. The last to resolve wins.
    fn record(&self, status: SatelliteStatus, error: Option<CoreError>) -> bool {
        if !self.is_live() {
            debug!(device = %self.device.name, %status, "device removed during probe, discarding result");
            return false;
        }

        let mut previous = None;
        self.snapshot.send_modify(|snap| {
            previous = snap.status.replace(status);
            snap.last_checked = Some(Utc::now());
            snap.last_error = error.map(|e| e.to_string());
            snap.polls += 1;
        });

        if previous == Some(status) {
            debug!(device = %self.device.name, %status, "status unchanged");
        } else {
            info!(
                device = %self.device.name,
                url = %self.device.homepage_url,
                from = ?previous,
                to = %status,
                "satellite status changed"
            );
        }
        true
    }

    fn view(&self, key: &IdentityKey) -> DeviceStatusView {
        DeviceStatusView {
            name: self.device.name.clone(),
            key: key.clone(),
            homepage_url: self.device.homepage_url.clone(),
            interval_ms: self.device.polling_interval_ms(),
            snapshot: self.snapshot.borrow().clone(),
        }
    }
}

/// Timer loop for one device. Never awaits a probe.
async fn poll_loop<P: Prober, H: AccessoryHandle>(ctx: Arc<PollContext<P, H>>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => break,
            _ = interval.tick() => {
                let ctx = Arc::clone(&ctx);
                tokio::spawn(async move { ctx.tick().await });
            }
        }
    }

    debug!(device = %ctx.device.name, "poll timer stopped");
}

/// Build the host's on-demand callback. Holds the context weakly so an
/// accessory keeping its reader does not keep a removed device alive.
fn status_reader<P: Prober, H: AccessoryHandle>(ctx: &Arc<PollContext<P, H>>) -> StatusReader {
    let weak: Weak<PollContext<P, H>> = Arc::downgrade(ctx);
    Arc::new(move || {
        let weak = weak.clone();
        Box::pin(async move {
            match weak.upgrade() {
                Some(ctx) if ctx.is_live() => ctx.read_now().await,
                _ => SatelliteStatus::NotConnected,
            }
        })
    })
}

// ── Runtime entries ──────────────────────────────────────────────

/// One live device: its timer task and shared context.
struct DeviceRuntimeEntry<P, H> {
    uuid: Uuid,
    ctx: Arc<PollContext<P, H>>,
    task: JoinHandle<()>,
}

impl<P, H> DeviceRuntimeEntry<P, H> {
    fn state(&self) -> ScheduleState {
        if self.ctx.cancel.is_cancelled() {
            ScheduleState::Cancelled
        } else {
            ScheduleState::Scheduled
        }
    }
}

// ── PollScheduler ────────────────────────────────────────────────

/// Owns every device's timer, keyed by identity key.
///
/// Invariant: at most one entry, and so at most one timer, per key.
pub struct PollScheduler<P, H> {
    prober: Arc<P>,
    entries: DashMap<IdentityKey, DeviceRuntimeEntry<P, H>>,
    cancel: CancellationToken,
}

impl<P: Prober, H: AccessoryHandle> PollScheduler<P, H> {
    pub fn new(prober: Arc<P>) -> Self {
        Self {
            prober,
            entries: DashMap::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn prober(&self) -> &Arc<P> {
        &self.prober
    }

    /// Start polling `device`, or keep polling it if already scheduled.
    ///
    /// An existing entry with identical configuration keeps its timer
    /// untouched. A changed configuration replaces the timer. Installs
    /// the on-demand reader on `handle`. Must run inside a tokio runtime.
    ///
    /// Returns `true` when a new timer was started.
    pub fn schedule(&self, key: IdentityKey, uuid: Uuid, device: DeviceConfig, handle: H) -> bool {
        if self.cancel.is_cancelled() {
            warn!(%key, "scheduler is shut down, not scheduling");
            return false;
        }

        // Check, replace, and insert happen under one shard lock: at most
        // one live timer per key.
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().ctx.device == device {
                    return false;
                }
                let entry = self.start(occupied.key(), uuid, device, handle);
                let displaced = occupied.insert(entry);
                displaced.ctx.cancel.cancel();
                debug!(key = %occupied.key(), "configuration changed, timer restarted");
            }
            Entry::Vacant(vacant) => {
                let entry = self.start(vacant.key(), uuid, device, handle);
                vacant.insert(entry);
            }
        }
        true
    }

    /// Spawn the timer for one device and install its reader.
    fn start(
        &self,
        key: &IdentityKey,
        uuid: Uuid,
        device: DeviceConfig,
        handle: H,
    ) -> DeviceRuntimeEntry<P, H> {
        let interval_ms = device.polling_interval_ms();
        let period = device.polling_period();
        if interval_ms <= 0 {
            warn!(
                device = %device.name,
                interval_ms,
                "non-positive polling interval, timer will fire every millisecond"
            );
        }

        let (snapshot, _) = watch::channel(DeviceSnapshot::default());
        let ctx = Arc::new(PollContext {
            device,
            handle,
            prober: Arc::clone(&self.prober),
            snapshot,
            cancel: self.cancel.child_token(),
        });

        ctx.handle.on_status_requested(status_reader(&ctx));
        let task = tokio::spawn(poll_loop(Arc::clone(&ctx), period));

        debug!(device = %ctx.device.name, %key, period_ms = period.as_millis(), "poll timer started");
        DeviceRuntimeEntry { uuid, ctx, task }
    }

    /// Cancel a device's timer and forget it. Returns its accessory handle.
    ///
    /// Probes already in flight finish but their results are discarded.
    pub fn cancel(&self, key: &IdentityKey) -> Option<H> {
        let (_, entry) = self.entries.remove(key)?;
        entry.ctx.cancel.cancel();
        debug!(device = %entry.ctx.device.name, %key, "poll timer cancelled");
        Some(entry.ctx.handle.clone())
    }

    /// [`cancel`](Self::cancel) by accessory UUID.
    pub fn cancel_uuid(&self, uuid: &Uuid) -> Option<(IdentityKey, H)> {
        let key = self
            .entries
            .iter()
            .find(|entry| entry.uuid == *uuid)
            .map(|entry| entry.key().clone())?;
        self.cancel(&key).map(|handle| (key, handle))
    }

    pub fn state(&self, key: &IdentityKey) -> ScheduleState {
        self.entries
            .get(key)
            .map_or(ScheduleState::Unscheduled, |entry| entry.state())
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// UUID and handle of every live entry.
    pub fn handles(&self) -> Vec<(Uuid, H)> {
        self.entries
            .iter()
            .map(|entry| (entry.uuid, entry.ctx.handle.clone()))
            .collect()
    }

    /// Watch a device's snapshots as polls resolve.
    pub fn subscribe(&self, key: &IdentityKey) -> Option<watch::Receiver<DeviceSnapshot>> {
        self.entries.get(key).map(|entry| entry.ctx.snapshot.subscribe())
    }

    pub fn snapshot(&self, key: &IdentityKey) -> Option<DeviceSnapshot> {
        self.entries
            .get(key)
            .map(|entry| entry.ctx.snapshot.borrow().clone())
    }

    /// All live devices, sorted by name.
    pub fn views(&self) -> Vec<DeviceStatusView> {
        let mut views: Vec<DeviceStatusView> = self
            .entries
            .iter()
            .map(|entry| entry.ctx.view(entry.key()))
            .collect();
        views.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));
        views
    }

    /// Probe one device immediately, outside its timer.
    ///
    /// `None` if the key is not scheduled. Failures degrade to
    /// `NotConnected`.
    pub async fn read_now(&self, key: &IdentityKey) -> Option<SatelliteStatus> {
        let ctx = self.entries.get(key).map(|entry| Arc::clone(&entry.ctx))?;
        Some(ctx.read_now().await)
    }

    /// Cancel every timer and wait for the timer tasks to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let keys: Vec<IdentityKey> = self.entries.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            let Some((_, entry)) = self.entries.remove(&key) else {
                continue;
            };
            if let Err(e) = entry.task.await {
                warn!(%key, error = %e, "poll timer task ended abnormally");
            }
        }
        debug!("poll scheduler shut down");
    }
}

impl<P, H> Drop for PollScheduler<P, H> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
