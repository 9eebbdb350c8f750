use std::{
    fs::File,
    io::Read,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::Config,
    state::{parse_stored_state, PersistedState},
};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not serialize state: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("No configuration directory available for the state file")]
    NoConfigDir,
    #[error("No category ids left")]
    CategoryIdsExhausted,
}

/// Where serialized state lives between sessions.
pub trait StateStore {
    fn load_raw(&self) -> Result<Option<String>, StorageError>;
    fn save_raw(&mut self, payload: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: PathBuf) -> Self {
        FileStateStore { path }
    }

    pub fn from_config(config: &Config) -> Result<Self, StorageError> {
        config
            .resolved_state_path()
            .map(Self::new)
            .ok_or(StorageError::NoConfigDir)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load_raw(&self) -> Result<Option<String>, StorageError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut payload = String::new();
        file.read_to_string(&mut payload)?;
        Ok(Some(payload))
    }

    fn save_raw(&mut self, payload: &str) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, payload)?;
        Ok(())
    }
}

/// Keeps the payload in memory. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    payload: Arc<Mutex<Option<String>>>,
}

impl MemoryStateStore {
    pub fn with_payload(payload: &str) -> Self {
        MemoryStateStore {
            payload: Arc::new(Mutex::new(Some(payload.to_string()))),
        }
    }

    pub fn payload(&self) -> Option<String> {
        self.payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StateStore for MemoryStateStore {
    fn load_raw(&self) -> Result<Option<String>, StorageError> {
        Ok(self.payload())
    }

    fn save_raw(&mut self, payload: &str) -> Result<(), StorageError> {
        let mut slot = self.payload.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(payload.to_string());
        Ok(())
    }
}

/// Loads the stored state, falling back to defaults if it cannot be read.
pub fn load_state<S>(store: &S, config: &Config) -> PersistedState
where
    S: StateStore + ?Sized,
{
    let raw = match store.load_raw() {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Failed to read stored state: {}", e);
            None
        }
    };
    parse_stored_state(raw.as_deref(), config)
}

pub fn save_state<S>(store: &mut S, state: &PersistedState) -> Result<(), StorageError>
where
    S: StateStore + ?Sized,
{
    let payload = state.to_json()?;
    store.save_raw(&payload)?;
    debug!("Saved state with {} categories", state.categories.len());
    Ok(())
}
