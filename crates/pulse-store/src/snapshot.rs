//! Whole-state snapshots and the durable stores that hold them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use pulse_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{LeadRecord, MessageEvent};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of the ledger and message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub saved_at: i64,
    #[serde(default)]
    pub leads: HashMap<String, LeadRecord>,
    #[serde(default)]
    pub messages: Vec<MessageEvent>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl Snapshot {
    pub fn new(saved_at: i64, leads: HashMap<String, LeadRecord>, messages: Vec<MessageEvent>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at,
            leads,
            messages,
        }
    }
}

/// Durable storage for the latest snapshot.
pub trait SnapshotStore: Send + Sync {
    /// Most recent snapshot, `Ok(None)` if nothing was saved yet.
    fn load(&self) -> Result<Option<Snapshot>>;
    /// Replace the stored snapshot.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Snapshot kept as a JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        let snapshot: Snapshot = serde_json::from_str(&data)
            .map_err(|e| Error::Snapshot(format!("{}: {}", self.path.display(), e)))?;

        info!(
            "Loaded snapshot from {}: {} leads, {} messages",
            self.path.display(),
            snapshot.leads.len(),
            snapshot.messages.len()
        );
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(snapshot)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Storage(format!("rename {}: {}", tmp.display(), e)))?;

        debug!(
            "Saved snapshot to {}: {} leads, {} messages",
            self.path.display(),
            snapshot.leads.len(),
            snapshot.messages.len()
        );
        Ok(())
    }
}

/// In-memory store holding the serialized snapshot. Useful for embedding
/// the engine without a data directory.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    data: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw snapshot text, bypassing serialization.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            data: Mutex::new(Some(raw.into())),
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        match self.data.lock().as_deref() {
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| Error::Snapshot(e.to_string())),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let raw = serde_json::to_string(snapshot)?;
        *self.data.lock() = Some(raw);
        Ok(())
    }
}
