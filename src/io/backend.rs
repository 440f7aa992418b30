use std::path::{Path, PathBuf};

use crate::model::{Automation, AutomationStatus, Bookmark, Collection, List};
use crate::ops::automation::AutomationRequest;
use crate::ops::lists::{AddToLists, bookmark_from_page, next_bookmark_id};

use super::collection_io::{CollectionError, load_collection, write_collection};

/// Where collection changes are sent.
///
/// Calls are fire-and-forget from the view's point of view: local state is
/// updated first and is not rolled back when a call fails.
pub trait CollectionBackend {
    fn load(&self) -> Result<Collection, CollectionError>;

    /// Persist the bookmark order of a list. `ids` must be a permutation of
    /// the list's bookmark IDs.
    fn save_bookmark_order(&mut self, list_id: &str, ids: &[String]) -> Result<(), CollectionError>;

    /// Bookmark every page into every list. Returns the number of bookmarks created.
    fn add_pages_to_lists(&mut self, request: &AddToLists) -> Result<usize, CollectionError>;

    fn remove_bookmark(&mut self, list_id: &str, bookmark_id: &str) -> Result<(), CollectionError>;

    /// Delete a recording and the pages captured in it. Bookmarks keep
    /// their own copy of the page, so lists are left alone. Returns the
    /// number of pages removed.
    fn delete_recording(&mut self, rec_id: &str) -> Result<usize, CollectionError>;

    /// Create a list from the request's links and queue an automation over it.
    fn start_automation(&mut self, request: &AutomationRequest) -> Result<Automation, CollectionError>;
}

/// Backend that edits `collection.json` in place
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: &Path) -> Self {
        FileBackend {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn update<T>(
        &self,
        f: impl FnOnce(&mut Collection) -> Result<T, CollectionError>,
    ) -> Result<T, CollectionError> {
        let mut collection = load_collection(&self.root)?;
        let out = f(&mut collection)?;
        write_collection(&self.root, &collection)?;
        Ok(out)
    }
}

impl CollectionBackend for FileBackend {
    fn load(&self) -> Result<Collection, CollectionError> {
        load_collection(&self.root)
    }

    fn save_bookmark_order(&mut self, list_id: &str, ids: &[String]) -> Result<(), CollectionError> {
        self.update(|coll| {
            let list = coll
                .find_list_mut(list_id)
                .ok_or_else(|| CollectionError::UnknownList(list_id.to_string()))?;
            list.bookmarks = reorder(&list.bookmarks, ids).ok_or_else(|| {
                CollectionError::OrderMismatch {
                    list: list_id.to_string(),
                }
            })?;
            Ok(())
        })?;
        tracing::info!(list = list_id, bookmarks = ids.len(), "saved bookmark order");
        Ok(())
    }

    fn add_pages_to_lists(&mut self, request: &AddToLists) -> Result<usize, CollectionError> {
        let added = self.update(|coll| {
            if let Some(missing) = request.lists.iter().find(|id| coll.find_list(id).is_none()) {
                return Err(CollectionError::UnknownList(missing.clone()));
            }
            let mut added = 0;
            for list_id in &request.lists {
                if let Some(list) = coll.find_list_mut(list_id) {
                    for page in &request.pages {
                        let bookmark = bookmark_from_page(page, &list.bookmarks);
                        list.bookmarks.push(bookmark);
                        added += 1;
                    }
                }
            }
            Ok(added)
        })?;
        tracing::info!(added, lists = request.lists.len(), "added pages to lists");
        Ok(added)
    }

    fn remove_bookmark(&mut self, list_id: &str, bookmark_id: &str) -> Result<(), CollectionError> {
        self.update(|coll| {
            let list = coll
                .find_list_mut(list_id)
                .ok_or_else(|| CollectionError::UnknownList(list_id.to_string()))?;
            let pos = list
                .bookmarks
                .iter()
                .position(|b| b.id == bookmark_id)
                .ok_or_else(|| CollectionError::UnknownBookmark {
                    list: list_id.to_string(),
                    bookmark: bookmark_id.to_string(),
                })?;
            list.bookmarks.remove(pos);
            Ok(())
        })?;
        tracing::info!(list = list_id, bookmark = bookmark_id, "removed bookmark");
        Ok(())
    }

    fn delete_recording(&mut self, rec_id: &str) -> Result<usize, CollectionError> {
        let removed = self.update(|coll| {
            let pos = coll
                .recordings
                .iter()
                .position(|r| r.id == rec_id)
                .ok_or_else(|| CollectionError::UnknownRecording(rec_id.to_string()))?;
            coll.recordings.remove(pos);
            let before = coll.pages.len();
            coll.pages.retain(|p| p.rec != rec_id);
            Ok(before - coll.pages.len())
        })?;
        tracing::info!(recording = rec_id, pages = removed, "deleted recording");
        Ok(removed)
    }

    fn start_automation(&mut self, request: &AutomationRequest) -> Result<Automation, CollectionError> {
        let automation = self.update(|coll| {
            let list_id = next_id("l", coll.lists.iter().map(|l| l.id.as_str()));
            let mut bookmarks: Vec<Bookmark> = Vec::with_capacity(request.bookmarks.len());
            for link in &request.bookmarks {
                let id = next_bookmark_id(&bookmarks);
                bookmarks.push(Bookmark {
                    id,
                    page_id: None,
                    title: link.title.clone(),
                    url: link.url.clone(),
                    timestamp: String::new(),
                    browser: None,
                });
            }
            coll.lists.push(List {
                id: list_id.clone(),
                title: request.list_title.clone(),
                bookmarks,
                revision: 0,
            });

            let automation = Automation {
                id: next_id("a", coll.automations.iter().map(|a| a.id.as_str())),
                list_id,
                status: AutomationStatus::Queued,
            };
            coll.automations.push(automation.clone());
            coll.queued = true;
            Ok(automation)
        })?;
        tracing::info!(
            user = %request.user,
            collection = %request.collection,
            automation = %automation.id,
            list = %automation.list_id,
            links = request.bookmarks.len(),
            "queued automation"
        );
        Ok(automation)
    }
}

/// Bookmarks of `current` arranged in `ids` order, or `None` when `ids`
/// isn't a permutation of their IDs.
fn reorder(current: &[Bookmark], ids: &[String]) -> Option<Vec<Bookmark>> {
    if ids.len() != current.len() {
        return None;
    }
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let bm = current.iter().find(|b| &b.id == id)?;
        if out.iter().any(|o: &Bookmark| &o.id == id) {
            return None;
        }
        out.push(bm.clone());
    }
    Some(out)
}

/// Next free `<prefix>N` ID
fn next_id<'a>(prefix: &str, existing: impl Iterator<Item = &'a str>) -> String {
    let max = existing
        .filter_map(|id| id.strip_prefix(prefix)?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{}", prefix, max + 1)
}
