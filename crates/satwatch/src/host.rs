//! File-backed accessory host.
//!
//! Stands in for a smart-home host framework: keeps accessories in memory,
//! persists the registered set to a JSON cache so they survive restarts,
//! and records every status push.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use satwatch_core::{
    AccessoryHandle, AccessoryHost, CoreError, SatelliteStatus, StaticMetadata, StatusReader,
};

/// Namespace for accessory UUIDs derived from identity-key seeds.
const IDENTITY_NAMESPACE: Uuid = Uuid::from_u128(0x5a7e_11a7_e5a7_4c0e_9b1d_2f3c_8d40_61ee);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Accessory handle ─────────────────────────────────────────────────

struct AccessoryState {
    uuid: Uuid,
    name: String,
    metadata: Mutex<Option<StaticMetadata>>,
    status: Mutex<Option<SatelliteStatus>>,
    reader: Mutex<Option<StatusReader>>,
}

/// One accessory. Clones share state.
#[derive(Clone)]
pub struct FileAccessory(Arc<AccessoryState>);

impl FileAccessory {
    fn new(uuid: Uuid, name: &str, metadata: Option<StaticMetadata>) -> Self {
        Self(Arc::new(AccessoryState {
            uuid,
            name: name.to_owned(),
            metadata: Mutex::new(metadata),
            status: Mutex::new(None),
            reader: Mutex::new(None),
        }))
    }

    pub fn metadata(&self) -> Option<StaticMetadata> {
        lock(&self.0.metadata).clone()
    }

    /// Ask for a fresh status through the installed reader, as a host
    /// would when a user opens the accessory. `None` without a reader.
    pub async fn request_status(&self) -> Option<SatelliteStatus> {
        let reader = lock(&self.0.reader).clone()?;
        Some(reader().await)
    }

    fn to_cached(&self) -> CachedAccessory {
        CachedAccessory {
            uuid: self.0.uuid,
            name: self.0.name.clone(),
            metadata: self.metadata(),
        }
    }
}

impl AccessoryHandle for FileAccessory {
    fn uuid(&self) -> Uuid {
        self.0.uuid
    }

    fn display_name(&self) -> String {
        self.0.name.clone()
    }

    fn set_static_metadata(&self, metadata: &StaticMetadata) {
        *lock(&self.0.metadata) = Some(metadata.clone());
    }

    fn set_status(&self, status: SatelliteStatus) {
        let previous = lock(&self.0.status).replace(status);
        debug!(accessory = %self.0.name, %status, ?previous, "status pushed");
    }

    fn on_status_requested(&self, reader: StatusReader) {
        *lock(&self.0.reader) = Some(reader);
    }
}

// ── Cache file ───────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct CachedAccessory {
    uuid: Uuid,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<StaticMetadata>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    accessories: Vec<CachedAccessory>,
}

// ── FileHost ─────────────────────────────────────────────────────────

/// Accessory registry persisted to a JSON file.
pub struct FileHost {
    path: PathBuf,
    registered: DashMap<Uuid, FileAccessory>,
}

impl FileHost {
    /// Load the registry from `path`. A missing file is an empty registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let registered = DashMap::new();

        match std::fs::read(&path) {
            Ok(bytes) => {
                let cache: CacheFile =
                    serde_json::from_slice(&bytes).map_err(|e| CoreError::Host {
                        message: format!("corrupt accessory cache {}: {e}", path.display()),
                    })?;
                for entry in cache.accessories {
                    let accessory = FileAccessory::new(entry.uuid, &entry.name, entry.metadata);
                    registered.insert(entry.uuid, accessory);
                }
                debug!(path = %path.display(), count = registered.len(), "accessory cache loaded");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no accessory cache yet");
            }
            Err(e) => {
                return Err(CoreError::Host {
                    message: format!("reading accessory cache {}: {e}", path.display()),
                });
            }
        }

        Ok(Self { path, registered })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), CoreError> {
        let mut accessories: Vec<CachedAccessory> = self
            .registered
            .iter()
            .map(|entry| entry.value().to_cached())
            .collect();
        accessories.sort_by(|a, b| a.name.cmp(&b.name).then(a.uuid.cmp(&b.uuid)));

        let host_err = |e: &dyn std::fmt::Display| CoreError::Host {
            message: format!("writing accessory cache {}: {e}", self.path.display()),
        };
        let json = serde_json::to_vec_pretty(&CacheFile { accessories }).map_err(|e| host_err(&e))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| host_err(&e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| host_err(&e))?;
        Ok(())
    }
}

impl AccessoryHost for FileHost {
    type Handle = FileAccessory;

    fn generate_identity(&self, seed: &str) -> Uuid {
        Uuid::new_v5(&IDENTITY_NAMESPACE, seed.as_bytes())
    }

    fn cached_accessories(&self) -> Vec<FileAccessory> {
        self.registered
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn lookup_cached_accessory(&self, uuid: &Uuid) -> Option<FileAccessory> {
        self.registered.get(uuid).map(|entry| entry.value().clone())
    }

    fn create_accessory(&self, name: &str, uuid: Uuid) -> FileAccessory {
        FileAccessory::new(uuid, name, None)
    }

    fn register_accessories(&self, handles: &[FileAccessory]) -> Result<(), CoreError> {
        for handle in handles {
            info!(accessory = %handle.display_name(), uuid = %handle.uuid(), "registering accessory");
            self.registered.insert(handle.uuid(), handle.clone());
        }
        self.persist()
    }

    fn unregister_accessories(&self, handles: &[FileAccessory]) -> Result<(), CoreError> {
        for handle in handles {
            info!(accessory = %handle.display_name(), uuid = %handle.uuid(), "unregistering accessory");
            self.registered.remove(&handle.uuid());
        }
        self.persist()
    }
}
