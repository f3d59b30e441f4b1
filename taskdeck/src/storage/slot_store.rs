//! Named storage slots
//!
//! A slot holds one serialized collection under a fixed key. Writes
//! replace the whole slot and are announced to subscribers by key.
//!
//! File-backed slots live at `<root>/<key>.json`.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Capacity of the change notification channel
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Key/value storage of whole serialized collections
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Raw contents of a slot, `None` when it was never written
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the contents of a slot
    async fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot entirely
    async fn remove(&self, key: &str) -> Result<()>;

    /// Receive the key of every slot written or removed from now on
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

/// Slot store keeping one JSON file per key
pub struct FileSlotStore {
    root: PathBuf,
    changes: broadcast::Sender<String>,
}

impl FileSlotStore {
    pub fn new(root: PathBuf) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { root, changes }
    }

    /// Create the root directory if needed
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Slot store initialized at: {:?}", self.root);
        Ok(())
    }

    fn get_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn notify(&self, key: &str) {
        // No receivers is fine
        let _ = self.changes.send(key.to_string());
    }
}

#[async_trait]
impl SlotStore for FileSlotStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.get_path(key);

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.get_path(key);

        // Per-write temp file then rename, so readers never see a partial
        // slot and concurrent writers never share an inode
        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        if let Err(e) = write_file(&temp_path, value).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }
        fs::rename(&temp_path, &path).await?;

        tracing::debug!("Wrote slot: {} ({} bytes)", key, value.len());
        self.notify(key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.get_path(key)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        tracing::debug!("Removed slot: {}", key);
        self.notify(key);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}

async fn write_file(path: &Path, value: &str) -> Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(value.as_bytes()).await?;
    file.sync_all().await?;
    Ok(())
}

/// Slot store held in process memory
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
    changes: broadcast::Sender<String>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            slots: Mutex::new(HashMap::new()),
            changes,
        }
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a consistent map of whole strings
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemorySlotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots().get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.slots().insert(key.to_string(), value.to_string());
        let _ = self.changes.send(key.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.slots().remove(key).is_some() {
            let _ = self.changes.send(key.to_string());
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}
