use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::collection_io::COLLECTION_FILE;

/// Events sent from the file watcher to the TUI event loop.
#[derive(Debug)]
pub enum FileEvent {
    /// `collection.json` changed on disk.
    CollectionChanged(PathBuf),
}

/// Watches a collection directory for changes to its data file.
pub struct CollectionWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl CollectionWatcher {
    /// Start watching `root`. Call `poll()` each tick.
    pub fn start(root: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };

                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }

                // Atomic writes land as a rename onto collection.json; temp
                // files and the .wrc state directory are ignored.
                if let Some(path) = event.paths.into_iter().find(|p| {
                    p.file_name().and_then(|n| n.to_str()) == Some(COLLECTION_FILE)
                }) {
                    let _ = tx.send(FileEvent::CollectionChanged(path));
                }
            },
            Config::default(),
        )?;

        watcher.watch(root, RecursiveMode::NonRecursive)?;
        Ok(CollectionWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending file events.
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}
