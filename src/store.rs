//! Key/value storage with local-storage semantics: string keys, string values,
//! whole-value overwrite, no versioning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::events::{AppEvent, EventBus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("other: {0}")]
    Other(String),
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store. Clones share the same map, like tabs sharing an origin.
#[derive(Clone, Default)]
pub struct MemoryStore {
    map: Arc<DashMap<String, String>>,
    events: Option<EventBus>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Publish an `AppEvent::Storage` for every write.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map.insert(key.to_string(), value.to_string());
        notify(&self.events, key, Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.map.remove(key);
        notify(&self.events, key, None);
        Ok(())
    }
}

/// Store mirrored to a JSON file, rewritten on every mutation.
#[derive(Clone)]
pub struct FileStore {
    state: Arc<RwLock<HashMap<String, String>>>,
    path: Arc<PathBuf>,
    events: Option<EventBus>,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "local_storage.json";

    /// Open `<dir>/local_storage.json`, starting empty if it is missing or unreadable.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(Self::FILE_NAME);
        let state = Self::load_from(&path);
        Self {
            state: Arc::new(RwLock::new(state)),
            path: Arc::new(path),
            events: None,
        }
    }

    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn path(&self) -> &Path { &self.path }

    fn load_from(path: &Path) -> HashMap<String, String> {
        match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(m) => {
                    info!("loaded local storage '{}'", path.display());
                    m
                }
                Err(e) => {
                    warn!("failed to parse '{}': {e}. Starting empty.", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }

    fn persist(&self, state: &HashMap<String, String>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(state)?;
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&*self.path, bytes)?;
        Ok(())
    }

    fn lock_err<E: std::fmt::Display>(e: E) -> StoreError {
        StoreError::Other(format!("state lock poisoned: {e}"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.state.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        {
            let mut s = self.state.write().map_err(Self::lock_err)?;
            s.insert(key.to_string(), value.to_string());
            self.persist(&s)?;
        }
        notify(&self.events, key, Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        {
            let mut s = self.state.write().map_err(Self::lock_err)?;
            s.remove(key);
            self.persist(&s)?;
        }
        notify(&self.events, key, None);
        Ok(())
    }
}

fn notify(events: &Option<EventBus>, key: &str, value: Option<&str>) {
    if let Some(bus) = events {
        bus.publish(AppEvent::Storage {
            key: key.to_string(),
            new_value: value.map(str::to_string),
        });
    }
}
