use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::{Collection, List};

/// Collection data file inside a collection directory
pub const COLLECTION_FILE: &str = "collection.json";

/// Per-collection directory for UI state and logs
pub const STATE_DIR: &str = ".wrc";

/// Error type for collection I/O operations
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("not a collection: no collection.json found")]
    NotACollection,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize collection: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("no list '{0}' in this collection")]
    UnknownList(String),
    #[error("no recording '{0}' in this collection")]
    UnknownRecording(String),
    #[error("no bookmark '{bookmark}' in list '{list}'")]
    UnknownBookmark { list: String, bookmark: String },
    #[error("saved order for list '{list}' does not match its bookmarks")]
    OrderMismatch { list: String },
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Find the collection directory by walking up from `start`, looking for
/// a `collection.json`.
pub fn discover_collection(start: &Path) -> Result<PathBuf, CollectionError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(COLLECTION_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(CollectionError::NotACollection);
        }
    }
}

pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

/// Load the collection stored in `root`. Each list gets a revision derived
/// from its content, so reloading an unchanged list yields the same identity.
pub fn load_collection(root: &Path) -> Result<Collection, CollectionError> {
    let path = root.join(COLLECTION_FILE);
    if !path.is_file() {
        return Err(CollectionError::NotACollection);
    }
    let text = fs::read_to_string(&path).map_err(|e| CollectionError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let mut collection: Collection =
        serde_json::from_str(&text).map_err(|e| CollectionError::ParseError {
            path: path.clone(),
            source: e,
        })?;
    for list in &mut collection.lists {
        list.revision = content_revision(list);
    }
    tracing::debug!(
        path = %path.display(),
        pages = collection.pages.len(),
        recordings = collection.recordings.len(),
        lists = collection.lists.len(),
        "loaded collection"
    );
    Ok(collection)
}

/// Write the collection back to `root` atomically.
pub fn write_collection(root: &Path, collection: &Collection) -> Result<(), CollectionError> {
    let path = root.join(COLLECTION_FILE);
    let content = serde_json::to_string_pretty(collection)?;
    atomic_write(&path, content.as_bytes())
        .map_err(|e| CollectionError::WriteError { path, source: e })
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn content_revision(list: &List) -> u64 {
    let mut hasher = DefaultHasher::new();
    list.title.hash(&mut hasher);
    for bm in &list.bookmarks {
        bm.id.hash(&mut hasher);
        bm.title.hash(&mut hasher);
        bm.url.hash(&mut hasher);
    }
    hasher.finish()
}
