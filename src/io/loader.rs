use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use crate::controller::load::LoadTicket;
use crate::model::Collection;

use super::collection_io::{CollectionError, load_collection};

/// A finished background load, tagged with the ticket it was issued for
#[derive(Debug)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub result: Result<Collection, CollectionError>,
}

/// Loads the collection off the UI thread.
///
/// Completions are delivered through `poll()`; deciding whether one is
/// still wanted is up to the caller's `LoadTracker`.
pub struct Loader {
    root: PathBuf,
    tx: mpsc::Sender<LoadCompletion>,
    rx: mpsc::Receiver<LoadCompletion>,
}

impl Loader {
    pub fn new(root: &Path) -> Self {
        let (tx, rx) = mpsc::channel();
        Loader {
            root: root.to_path_buf(),
            tx,
            rx,
        }
    }

    pub fn request(&self, ticket: LoadTicket) {
        let tx = self.tx.clone();
        let root = self.root.clone();
        thread::spawn(move || {
            let result = load_collection(&root);
            // The receiver is gone once the TUI has exited.
            let _ = tx.send(LoadCompletion { ticket, result });
        });
    }

    /// Non-blocking poll for finished loads.
    pub fn poll(&self) -> Vec<LoadCompletion> {
        let mut done = Vec::new();
        while let Ok(c) = self.rx.try_recv() {
            done.push(c);
        }
        done
    }
}
