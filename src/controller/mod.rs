//! Selection and ordering state for the collection view.
//!
//! [`Controller`] owns the displayed sequences (flat page table, pages
//! grouped by recording, and the local copy of an open bookmark list)
//! together with every piece of transient view state that indexes into
//! them. Any time a displayed sequence is replaced the selections that
//! point into it are reset, so indices held here are always valid.

pub mod debounce;
pub mod grouped;
pub mod keyseq;
pub mod load;
pub mod reorder;
pub mod scroll;
pub mod selection;

use std::time::Instant;

use crate::io::backend::CollectionBackend;
use crate::io::collection_io::CollectionError;
use crate::io::state::KeyValueStore;
use crate::model::{Bookmark, Collection, Page, Recording, SortBy, SortColumn};
use crate::ops::{search, sort};

use grouped::GroupedSelection;
use keyseq::KeySequenceDetector;
use load::{LoadTicket, LoadTracker};
use reorder::BookmarkOrder;
use scroll::{ScrollMetrics, ScrollState};
use selection::{ClickModifier, ClickOutcome, Selection};

/// Store key holding the persisted view mode (JSON `true` = grouped)
pub const VIEW_MODE_KEY: &str = "groupDisplay";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Flat,
    Grouped,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Flat => ViewMode::Grouped,
            ViewMode::Grouped => ViewMode::Flat,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Flat => "flat",
            ViewMode::Grouped => "grouped",
        }
    }

    /// Value written under [`VIEW_MODE_KEY`]
    pub fn to_stored(self) -> String {
        (self == ViewMode::Grouped).to_string()
    }

    fn from_stored(raw: &str) -> Result<Self, serde_json::Error> {
        let grouped: bool = serde_json::from_str(raw)?;
        Ok(if grouped {
            ViewMode::Grouped
        } else {
            ViewMode::Flat
        })
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(ViewMode::Flat),
            "grouped" => Ok(ViewMode::Grouped),
            _ => Err(format!("unknown view '{}' (flat, grouped)", s)),
        }
    }
}

/// A recording and its pages, as shown in the grouped view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub recording: Recording,
    pub pages: Vec<Page>,
}

impl Group {
    pub fn id(&self) -> &str {
        &self.recording.id
    }
}

pub struct Controller {
    collection: Collection,
    /// Flat table rows: collection pages, searched then sorted
    pages: Vec<Page>,
    groups: Vec<Group>,
    search_text: String,
    active_list: Option<BookmarkOrder>,

    view_mode: ViewMode,
    expand_all: bool,
    selection: Selection,
    grouped: GroupedSelection,
    /// Recording to reveal once the grouped view is shown
    pending_reveal: Option<String>,
    /// First visible row of the grouped view
    grouped_scroll: usize,

    keys: KeySequenceDetector,
    scroll: ScrollState,
    loads: LoadTracker,
    mounted: bool,
}

impl Controller {
    pub fn new(collection: Collection) -> Self {
        let mut controller = Controller {
            collection,
            pages: Vec::new(),
            groups: Vec::new(),
            search_text: String::new(),
            active_list: None,
            view_mode: ViewMode::Flat,
            expand_all: false,
            selection: Selection::None,
            grouped: GroupedSelection::default(),
            pending_reveal: None,
            grouped_scroll: 0,
            keys: KeySequenceDetector::default(),
            scroll: ScrollState::default(),
            loads: LoadTracker::default(),
            mounted: false,
        };
        controller.rebuild_pages();
        controller.rebuild_groups();
        controller
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Activate the view: restore the persisted view mode and start
    /// listening for keys.
    pub fn mount(&mut self, store: &dyn KeyValueStore) {
        self.view_mode = read_view_mode(store);
        self.mounted = true;
    }

    /// Deactivate the view: stop listening for keys, cancel pending timers
    /// and drop outstanding loads.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.keys.cancel();
        self.scroll.cancel();
        self.loads.invalidate();
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    // -----------------------------------------------------------------------
    // Data
    // -----------------------------------------------------------------------

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn active_list(&self) -> Option<&BookmarkOrder> {
        self.active_list.as_ref()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn sort_by(&self) -> SortBy {
        self.collection.sort
    }

    /// Number of rows in the flat table (bookmarks when a list is open)
    pub fn displayed_len(&self) -> usize {
        match &self.active_list {
            Some(order) => order.len(),
            None => self.pages.len(),
        }
    }

    /// Start a background load. The completion must be passed to
    /// [`Controller::finish_load`] with the returned ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.loads.issue()
    }

    /// Apply a finished load if its ticket is still current.
    /// Returns false when the completion was stale and dropped.
    pub fn finish_load(&mut self, ticket: &LoadTicket, collection: Collection) -> bool {
        if !self.mounted || !self.loads.accept(ticket) {
            tracing::debug!(generation = ticket.generation(), "discarding stale load");
            return false;
        }
        self.replace_collection(collection);
        true
    }

    /// Replace the collection data. Every displayed sequence is rebuilt and
    /// selections reset; an open list keeps its local order unless the
    /// loaded list is a different one.
    pub fn replace_collection(&mut self, collection: Collection) {
        self.collection = collection;
        self.rebuild_pages();
        self.rebuild_groups();
        if let Some(order) = &mut self.active_list {
            match self.collection.lists.iter().find(|l| l.id == order.list_id()) {
                Some(list) => {
                    order.sync(list);
                }
                None => {
                    tracing::info!(list = order.list_id(), "open list no longer exists");
                    self.active_list = None;
                    self.loads.watch(None);
                }
            }
        }
        self.reset_selections();
    }

    fn rebuild_pages(&mut self) {
        let mut pages = search::search_pages(&self.collection.pages, &self.search_text);
        sort::sort_pages(&mut pages, self.collection.sort);
        self.pages = pages;
    }

    fn rebuild_groups(&mut self) {
        let mut recordings = self.collection.recordings.clone();
        recordings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        self.groups = recordings
            .into_iter()
            .map(|recording| {
                let mut pages: Vec<Page> = self
                    .collection
                    .recording_pages(&recording.id)
                    .cloned()
                    .collect();
                sort::sort_pages(&mut pages, SortBy::default());
                Group { recording, pages }
            })
            .collect();
    }

    fn reset_selections(&mut self) {
        self.selection.clear();
        self.grouped.clear();
    }

    // -----------------------------------------------------------------------
    // Flat selection
    // -----------------------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Click row `index` of the flat table. Returns false when rejected.
    pub fn select_row(&mut self, index: usize, modifier: ClickModifier) -> bool {
        let len = self.displayed_len();
        match self.selection.click(index, modifier, len) {
            ClickOutcome::Rejected => {
                tracing::debug!(index, len, "ignoring click outside the table");
                false
            }
            ClickOutcome::Cleared => true,
            ClickOutcome::Selected => {
                self.grouped.clear();
                true
            }
        }
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.is_selected(index)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected pages of the flat table, in selection order
    pub fn selected_pages(&self) -> Vec<Page> {
        if self.active_list.is_some() {
            return Vec::new();
        }
        self.selection
            .indices()
            .into_iter()
            .filter_map(|i| self.pages.get(i).cloned())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Grouped view
    // -----------------------------------------------------------------------

    pub fn grouped(&self) -> &GroupedSelection {
        &self.grouped
    }

    pub fn expand_all(&self) -> bool {
        self.expand_all
    }

    pub fn toggle_expand_all(&mut self) {
        self.expand_all = !self.expand_all;
    }

    pub fn is_group_expanded(&self, group_id: &str) -> bool {
        self.grouped.is_expanded(group_id, self.expand_all)
    }

    pub fn expand_group(&mut self, group_id: &str) -> bool {
        if self.find_group(group_id).is_none() {
            return false;
        }
        self.grouped.expand(group_id, self.expand_all)
    }

    pub fn collapse_group(&mut self) -> bool {
        self.grouped.collapse(self.expand_all)
    }

    /// Click row `index` of group `group_id`.
    pub fn select_grouped_row(&mut self, group_id: &str, index: usize) -> bool {
        let len = match self.find_group(group_id) {
            Some(g) => g.pages.len(),
            None => return false,
        };
        match self.grouped.click(group_id, index, len) {
            ClickOutcome::Rejected => false,
            ClickOutcome::Cleared => true,
            ClickOutcome::Selected => {
                self.selection.clear();
                true
            }
        }
    }

    /// The page selected in the grouped view
    pub fn selected_grouped_page(&self) -> Option<&Page> {
        let group = self.find_group(self.grouped.expanded_group()?)?;
        group.pages.get(self.grouped.selected_index_in_group()?)
    }

    pub fn find_group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id() == group_id)
    }

    pub fn grouped_scroll(&self) -> usize {
        self.grouped_scroll
    }

    pub fn set_grouped_scroll(&mut self, row: usize) {
        self.grouped_scroll = row;
    }

    /// Number of rows the grouped view occupies: one header per group plus
    /// the pages of expanded groups.
    pub fn grouped_row_count(&self) -> usize {
        self.groups
            .iter()
            .map(|g| 1 + if self.is_group_expanded(g.id()) { g.pages.len() } else { 0 })
            .sum()
    }

    /// Row of `group_id`'s header in the grouped view
    pub fn group_row_offset(&self, group_id: &str) -> Option<usize> {
        let mut row = 0;
        for g in &self.groups {
            if g.id() == group_id {
                return Some(row);
            }
            row += 1;
            if self.is_group_expanded(g.id()) {
                row += g.pages.len();
            }
        }
        None
    }

    /// Expand and select `group_id`, then scroll it to the top.
    fn open_and_scroll(&mut self, group_id: &str) {
        if self.find_group(group_id).is_none() {
            tracing::debug!(recording = group_id, "no such recording to reveal");
            return;
        }
        self.selection.clear();
        if !self.expand_all {
            self.grouped.expand(group_id, false);
        }
        if let Some(row) = self.group_row_offset(group_id) {
            self.grouped_scroll = row;
        }
    }

    /// Show a recording in the grouped view, switching to it first if needed.
    pub fn reveal_recording(&mut self, rec_id: &str, store: &mut dyn KeyValueStore) {
        match self.view_mode {
            ViewMode::Flat => {
                self.pending_reveal = Some(rec_id.to_string());
                self.set_view_mode(ViewMode::Grouped, store);
            }
            ViewMode::Grouped => self.open_and_scroll(rec_id),
        }
    }

    // -----------------------------------------------------------------------
    // View mode
    // -----------------------------------------------------------------------

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Switch view mode and persist it. All transient view state is reset;
    /// a pending reveal is carried out when entering the grouped view.
    pub fn set_view_mode(&mut self, mode: ViewMode, store: &mut dyn KeyValueStore) {
        if let Err(e) = store.set(VIEW_MODE_KEY, mode.to_stored()) {
            tracing::warn!(error = %e, "could not persist view mode");
        }
        let previous = self.view_mode;
        self.view_mode = mode;
        self.reset_selections();
        self.expand_all = false;
        self.grouped_scroll = 0;
        self.scroll.reset();

        let reveal = self.pending_reveal.take();
        if previous == ViewMode::Flat
            && mode == ViewMode::Grouped
            && let Some(rec_id) = reveal
        {
            self.open_and_scroll(&rec_id);
        }
    }

    pub fn toggle_view_mode(&mut self, store: &mut dyn KeyValueStore) {
        self.set_view_mode(self.view_mode.toggled(), store);
    }

    // -----------------------------------------------------------------------
    // Sort and search
    // -----------------------------------------------------------------------

    /// Sort the flat table by `column`, flipping direction if it is
    /// already the sort column.
    pub fn sort(&mut self, column: SortColumn) {
        self.selection.clear();
        self.collection.sort = sort::next_sort(self.collection.sort, column);
        self.rebuild_pages();
    }

    /// Filter the flat table. Searching always happens in the flat view.
    pub fn search(&mut self, query: &str, store: &mut dyn KeyValueStore) {
        if self.view_mode == ViewMode::Grouped {
            self.set_view_mode(ViewMode::Flat, store);
        }
        self.search_text = query.to_string();
        self.rebuild_pages();
        self.selection.clear();
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    /// Show the bookmarks of `list_id` instead of the page table, or the
    /// page table again with `None`.
    pub fn open_list(&mut self, list_id: Option<&str>) -> bool {
        let order = match list_id {
            Some(id) => match self.collection.find_list(id) {
                Some(list) => Some(BookmarkOrder::from_list(list)),
                None => return false,
            },
            None => None,
        };
        self.active_list = order;
        self.loads.watch(list_id);
        self.reset_selections();
        true
    }

    pub fn active_bookmarks(&self) -> &[Bookmark] {
        self.active_list.as_ref().map_or(&[], |o| o.bookmarks())
    }

    /// Move a bookmark of the open list. Applied locally only.
    pub fn move_bookmark(&mut self, from: usize, to: usize) -> bool {
        let moved = self
            .active_list
            .as_mut()
            .is_some_and(|order| order.move_item(from, to));
        if moved {
            self.selection.clear();
        }
        moved
    }

    /// Send the open list's local order to the backend. The local order is
    /// kept whether or not the save succeeds.
    pub fn save_order(&mut self, backend: &mut dyn CollectionBackend) -> Result<(), CollectionError> {
        let order = match &mut self.active_list {
            Some(order) => order,
            None => return Ok(()),
        };
        let ids = order.ids();
        match backend.save_bookmark_order(order.list_id(), &ids) {
            Ok(()) => {
                order.mark_saved();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(list = order.list_id(), error = %e, "saving bookmark order failed");
                Err(e)
            }
        }
    }

    /// Delete a recording and its pages through the backend, then drop them
    /// locally so the views update before the next load. Returns the number
    /// of pages the backend removed.
    pub fn delete_recording(
        &mut self,
        rec_id: &str,
        backend: &mut dyn CollectionBackend,
    ) -> Result<usize, CollectionError> {
        let removed = backend.delete_recording(rec_id).inspect_err(|e| {
            tracing::warn!(recording = rec_id, error = %e, "deleting recording failed");
        })?;
        self.collection.recordings.retain(|r| r.id != rec_id);
        self.collection.pages.retain(|p| p.rec != rec_id);
        if self.pending_reveal.as_deref() == Some(rec_id) {
            self.pending_reveal = None;
        }
        self.rebuild_pages();
        self.rebuild_groups();
        self.reset_selections();
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Keys and timers
    // -----------------------------------------------------------------------

    /// Feed a key code to the automation sequence detector. Returns true
    /// when the automation modal should open. Ignored while unmounted.
    pub fn press_key(&mut self, code: u16, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        self.keys.press(code, now)
    }

    pub fn key_buffer(&self) -> &[u16] {
        self.keys.buffer()
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) {
        if self.mounted {
            self.scroll.on_scroll(metrics, now);
        }
    }

    pub fn is_condensed(&self) -> bool {
        self.scroll.is_condensed()
    }

    /// A load was issued and has not been applied yet
    pub fn is_loading(&self) -> bool {
        self.loads.is_pending()
    }

    /// Run due timers. Returns true when visible state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.keys.tick(now);
        self.scroll.tick(now)
    }
}

/// Read the persisted view mode, falling back to flat when it is missing
/// or malformed.
fn read_view_mode(store: &dyn KeyValueStore) -> ViewMode {
    let Some(raw) = store.get(VIEW_MODE_KEY) else {
        return ViewMode::default();
    };
    ViewMode::from_stored(&raw).unwrap_or_else(|e| {
        tracing::warn!(value = %raw, error = %e, "malformed stored view mode, using flat view");
        ViewMode::default()
    })
}

#[cfg(test)]
mod tests;
