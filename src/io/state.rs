use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::collection_io::atomic_write;

/// String key-value store for UI preferences that outlive a session
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StateError>;
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Error type for persisting UI state
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize state: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Key-value store persisted as a JSON object in `state.json`.
///
/// A missing or malformed file reads as empty; every `set` rewrites the file.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl StateFile {
    /// Open the store in `state_dir`, creating nothing until the first write.
    pub fn open(state_dir: &Path) -> Self {
        let path = state_dir.join("state.json");
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed state file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        StateFile { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for StateFile {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StateError> {
        self.entries.insert(key.to_string(), value);
        let content = serde_json::to_string_pretty(&self.entries)?;
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            atomic_write(&self.path, content.as_bytes())
        };
        write().map_err(|e| StateError::WriteError {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// In-memory store, used when no collection directory is available
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StateError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
