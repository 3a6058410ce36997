// Shared fakes for the core integration tests: a scripted prober and an
// in-memory host that records every call made against it.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use uuid::Uuid;

use satwatch_api::{NormalizedOrigin, ProbeErrorKind};
use satwatch_core::{
    AccessoryHandle, AccessoryHost, CoreError, DeviceConfig, SatelliteStatus, StaticMetadata,
    StatusReader,
};

// ── Scripted prober ─────────────────────────────────────────────────

/// What the prober does for a given host.
#[derive(Clone)]
pub enum Reply {
    Up,
    Down,
    Fail,
    Hang,
    Gate(Arc<Notify>),
}

/// Prober answering per host from a script. Unscripted hosts fail.
#[derive(Default)]
pub struct ScriptedProber {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, host: &str, reply: Reply) -> Self {
        self.set(host, reply);
        self
    }

    pub fn set(&self, host: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(host.to_owned(), reply);
    }

    pub fn calls(&self, host: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.as_str() == host)
            .count()
    }
}

impl satwatch_core::Prober for ScriptedProber {
    fn check(
        &self,
        origin: &NormalizedOrigin,
    ) -> impl Future<Output = Result<SatelliteStatus, CoreError>> + Send {
        self.calls.lock().unwrap().push(origin.host.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&origin.host)
            .cloned()
            .unwrap_or(Reply::Fail);
        let url = origin.to_string();

        async move {
            match reply {
                Reply::Up => Ok(SatelliteStatus::Connected),
                Reply::Down => Ok(SatelliteStatus::NotConnected),
                Reply::Fail => Err(CoreError::Probe {
                    url,
                    kind: ProbeErrorKind::Connect,
                    reason: "connection refused".into(),
                }),
                Reply::Hang => std::future::pending().await,
                Reply::Gate(gate) => {
                    gate.notified().await;
                    Ok(SatelliteStatus::Connected)
                }
            }
        }
    }
}

// ── Recording host ──────────────────────────────────────────────────

struct HandleState {
    uuid: Uuid,
    name: String,
    metadata: Mutex<Option<StaticMetadata>>,
    statuses: Mutex<Vec<SatelliteStatus>>,
    reader: Mutex<Option<StatusReader>>,
}

#[derive(Clone)]
pub struct RecordingHandle(Arc<HandleState>);

impl RecordingHandle {
    pub fn new(name: &str, uuid: Uuid) -> Self {
        Self(Arc::new(HandleState {
            uuid,
            name: name.to_owned(),
            metadata: Mutex::new(None),
            statuses: Mutex::new(Vec::new()),
            reader: Mutex::new(None),
        }))
    }

    pub fn metadata(&self) -> Option<StaticMetadata> {
        self.0.metadata.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<SatelliteStatus> {
        self.0.statuses.lock().unwrap().clone()
    }

    /// Invoke the installed on-demand reader.
    pub async fn read(&self) -> SatelliteStatus {
        let reader = self.0.reader.lock().unwrap().clone().unwrap();
        reader().await
    }

    pub fn has_reader(&self) -> bool {
        self.0.reader.lock().unwrap().is_some()
    }
}

impl AccessoryHandle for RecordingHandle {
    fn uuid(&self) -> Uuid {
        self.0.uuid
    }

    fn display_name(&self) -> String {
        self.0.name.clone()
    }

    fn set_static_metadata(&self, metadata: &StaticMetadata) {
        *self.0.metadata.lock().unwrap() = Some(metadata.clone());
    }

    fn set_status(&self, status: SatelliteStatus) {
        self.0.statuses.lock().unwrap().push(status);
    }

    fn on_status_requested(&self, reader: StatusReader) {
        *self.0.reader.lock().unwrap() = Some(reader);
    }
}

#[derive(Default)]
pub struct RecordingHost {
    cached: Mutex<Vec<RecordingHandle>>,
    created: Mutex<Vec<RecordingHandle>>,
    register_calls: Mutex<Vec<Vec<Uuid>>>,
    unregister_calls: Mutex<Vec<Vec<Uuid>>>,
    fail_register: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_registration() -> Self {
        Self {
            fail_register: true,
            ..Self::default()
        }
    }

    /// Pretend `device` survived a restart.
    pub fn with_cached(self, device: &DeviceConfig) -> Self {
        let uuid = self.generate_identity(device.identity_key().as_str());
        self.cached
            .lock()
            .unwrap()
            .push(RecordingHandle::new(&device.name, uuid));
        self
    }

    pub fn handle_for(&self, device: &DeviceConfig) -> RecordingHandle {
        let uuid = self.generate_identity(device.identity_key().as_str());
        let cached = self.cached.lock().unwrap();
        let created = self.created.lock().unwrap();
        cached
            .iter()
            .chain(created.iter())
            .find(|h| h.uuid() == uuid)
            .cloned()
            .unwrap()
    }

    pub fn register_calls(&self) -> Vec<Vec<Uuid>> {
        self.register_calls.lock().unwrap().clone()
    }

    pub fn unregister_calls(&self) -> Vec<Vec<Uuid>> {
        self.unregister_calls.lock().unwrap().clone()
    }
}

impl AccessoryHost for RecordingHost {
    type Handle = RecordingHandle;

    fn generate_identity(&self, seed: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes())
    }

    fn cached_accessories(&self) -> Vec<RecordingHandle> {
        self.cached.lock().unwrap().clone()
    }

    fn create_accessory(&self, name: &str, uuid: Uuid) -> RecordingHandle {
        let handle = RecordingHandle::new(name, uuid);
        self.created.lock().unwrap().push(handle.clone());
        handle
    }

    fn register_accessories(&self, handles: &[RecordingHandle]) -> Result<(), CoreError> {
        self.register_calls
            .lock()
            .unwrap()
            .push(handles.iter().map(AccessoryHandle::uuid).collect());
        if self.fail_register {
            return Err(CoreError::Host {
                message: "registry unavailable".into(),
            });
        }
        Ok(())
    }

    fn unregister_accessories(&self, handles: &[RecordingHandle]) -> Result<(), CoreError> {
        let uuids: Vec<Uuid> = handles.iter().map(AccessoryHandle::uuid).collect();
        self.cached.lock().unwrap().retain(|h| !uuids.contains(&h.uuid()));
        self.unregister_calls.lock().unwrap().push(uuids);
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

pub fn device(name: &str, url: &str, interval_ms: &str) -> DeviceConfig {
    DeviceConfig::new(name, url).with_polling_interval(interval_ms)
}

pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
