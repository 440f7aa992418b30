use crate::model::{Bookmark, List};

/// Local, reorderable copy of a list's bookmarks.
///
/// Reorders apply immediately and are only flushed to the backend on an
/// explicit save. A failed save is not rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkOrder {
    list_id: String,
    revision: u64,
    bookmarks: Vec<Bookmark>,
    unsaved: bool,
}

impl BookmarkOrder {
    pub fn from_list(list: &List) -> Self {
        BookmarkOrder {
            list_id: list.id.clone(),
            revision: list.revision,
            bookmarks: list.bookmarks.clone(),
            unsaved: false,
        }
    }

    /// Replace the local copy when `list` is a different loaded list than
    /// the one this order was built from. Returns true when replaced.
    pub fn sync(&mut self, list: &List) -> bool {
        if list.identity() == (self.list_id.as_str(), self.revision) {
            return false;
        }
        *self = BookmarkOrder::from_list(list);
        true
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    /// Local order differs from what was last saved or loaded
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Move the bookmark at `from` so it ends up at `to`. `to` indexes the
    /// sequence after removal, so `to == len - 1` moves to the end.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        let len = self.bookmarks.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }
        let item = self.bookmarks.remove(from);
        self.bookmarks.insert(to, item);
        self.unsaved = true;
        true
    }

    /// Bookmark IDs in local order, as sent on save
    pub fn ids(&self) -> Vec<String> {
        self.bookmarks.iter().map(|b| b.id.clone()).collect()
    }

    pub(crate) fn mark_saved(&mut self) {
        self.unsaved = false;
    }
}
