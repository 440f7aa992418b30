use std::cell::RefCell;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use super::*;
use crate::io::state::{MemoryStore, StateError};
use crate::model::{Automation, List, SortDirection};
use crate::ops::automation::AutomationRequest;
use crate::ops::lists::AddToLists;

fn page(id: &str, rec: &str, ts: &str) -> Page {
    Page {
        id: id.into(),
        title: format!("Page {}", id),
        url: format!("http://example.com/{}", id),
        timestamp: ts.into(),
        rec: rec.into(),
        browser: None,
    }
}

fn bookmark(id: &str) -> Bookmark {
    Bookmark {
        id: id.into(),
        page_id: None,
        title: id.into(),
        url: format!("http://example.com/{}", id),
        timestamp: String::new(),
        browser: None,
    }
}

/// Five pages across two recordings, plus one list of four bookmarks
fn sample_collection() -> Collection {
    Collection {
        id: "web".into(),
        user: "alice".into(),
        title: "Web".into(),
        pages: vec![
            page("p1", "g1", "20180101000001"),
            page("p2", "g1", "20180101000002"),
            page("p3", "g2", "20180101000003"),
            page("p4", "g2", "20180101000004"),
            page("p5", "g2", "20180101000005"),
        ],
        recordings: vec![
            Recording {
                id: "g1".into(),
                title: "First".into(),
                created_at: "20180101000000".into(),
            },
            Recording {
                id: "g2".into(),
                title: "Second".into(),
                created_at: "20180102000000".into(),
            },
        ],
        lists: vec![List {
            id: "l1".into(),
            title: "Reading".into(),
            bookmarks: vec![bookmark("A"), bookmark("B"), bookmark("C"), bookmark("D")],
            revision: 1,
        }],
        sort: SortBy::default(),
        queued: false,
        automations: vec![],
    }
}

fn mounted() -> (Controller, MemoryStore) {
    let store = MemoryStore::default();
    let mut c = Controller::new(sample_collection());
    c.mount(&store);
    (c, store)
}

#[derive(Default)]
struct RecordingBackend {
    saved: RefCell<Vec<(String, Vec<String>)>>,
    deleted: Vec<String>,
    fail: bool,
}

impl CollectionBackend for RecordingBackend {
    fn load(&self) -> Result<Collection, CollectionError> {
        Ok(sample_collection())
    }

    fn save_bookmark_order(&mut self, list_id: &str, ids: &[String]) -> Result<(), CollectionError> {
        if self.fail {
            return Err(CollectionError::UnknownList(list_id.to_string()));
        }
        self.saved
            .borrow_mut()
            .push((list_id.to_string(), ids.to_vec()));
        Ok(())
    }

    fn add_pages_to_lists(&mut self, request: &AddToLists) -> Result<usize, CollectionError> {
        Ok(request.bookmark_count())
    }

    fn remove_bookmark(&mut self, _list_id: &str, _bookmark_id: &str) -> Result<(), CollectionError> {
        Ok(())
    }

    fn delete_recording(&mut self, rec_id: &str) -> Result<usize, CollectionError> {
        if self.fail {
            return Err(CollectionError::UnknownRecording(rec_id.to_string()));
        }
        self.deleted.push(rec_id.to_string());
        let coll = sample_collection();
        Ok(coll.recording_pages(rec_id).count())
    }

    fn start_automation(&mut self, _request: &AutomationRequest) -> Result<Automation, CollectionError> {
        Err(CollectionError::NotACollection)
    }
}

struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: String) -> Result<(), StateError> {
        Err(StateError::WriteError {
            path: "/nowhere/state.json".into(),
            source: std::io::Error::other("read-only"),
        })
    }
}

// ---------------------------------------------------------------------------
// Mount and view mode persistence
// ---------------------------------------------------------------------------

#[test]
fn mount_restores_grouped_mode() {
    let mut store = MemoryStore::default();
    store.set(VIEW_MODE_KEY, "true".into()).unwrap();
    let mut c = Controller::new(sample_collection());
    c.mount(&store);
    assert_eq!(c.view_mode(), ViewMode::Grouped);
    assert!(c.is_mounted());
}

#[test]
fn mount_ignores_malformed_mode() {
    let mut store = MemoryStore::default();
    store.set(VIEW_MODE_KEY, "{oops".into()).unwrap();
    let mut c = Controller::new(sample_collection());
    c.mount(&store);
    assert_eq!(c.view_mode(), ViewMode::Flat);
}

#[test]
fn set_view_mode_persists() {
    let (mut c, mut store) = mounted();
    c.set_view_mode(ViewMode::Grouped, &mut store);
    assert_eq!(store.get(VIEW_MODE_KEY).as_deref(), Some("true"));
    c.toggle_view_mode(&mut store);
    assert_eq!(c.view_mode(), ViewMode::Flat);
    assert_eq!(store.get(VIEW_MODE_KEY).as_deref(), Some("false"));
}

#[test]
fn persist_failure_still_switches_mode() {
    let (mut c, _) = mounted();
    c.set_view_mode(ViewMode::Grouped, &mut FailingStore);
    assert_eq!(c.view_mode(), ViewMode::Grouped);
}

// ---------------------------------------------------------------------------
// Flat and grouped selection interplay
// ---------------------------------------------------------------------------

#[test]
fn select_row_then_repeat_clears() {
    let (mut c, _) = mounted();
    for i in 0..5 {
        assert!(c.select_row(i, ClickModifier::None));
        assert_eq!(c.selection(), &Selection::Single(i));
        assert!(c.select_row(i, ClickModifier::None));
        assert_eq!(c.selection(), &Selection::None);
    }
}

#[test]
fn select_row_out_of_range_is_noop() {
    let (mut c, _) = mounted();
    c.select_row(1, ClickModifier::None);
    assert!(!c.select_row(5, ClickModifier::Meta));
    assert_eq!(c.selection(), &Selection::Single(1));
}

#[test]
fn flat_selection_clears_grouped_selection() {
    let (mut c, _) = mounted();
    c.select_grouped_row("g2", 1);
    assert!(!c.grouped().is_empty());
    c.select_row(0, ClickModifier::None);
    assert!(c.grouped().is_empty());
}

#[test]
fn grouped_selection_clears_flat_selection() {
    let (mut c, _) = mounted();
    c.select_row(0, ClickModifier::None);
    c.select_grouped_row("g1", 0);
    assert!(c.selection().is_empty());
    assert_eq!(c.selected_grouped_page().map(|p| p.id.as_str()), Some("p1"));
}

#[test]
fn selected_pages_follow_selection_order() {
    let (mut c, _) = mounted();
    c.select_row(3, ClickModifier::None);
    c.select_row(0, ClickModifier::Meta);
    let ids: Vec<String> = c.selected_pages().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["p4", "p1"]);
}

#[test]
fn grouped_to_flat_clears_grouped_selection() {
    let (mut c, mut store) = mounted();
    c.set_view_mode(ViewMode::Grouped, &mut store);
    c.select_grouped_row("g2", 2);
    assert_eq!(c.grouped().expanded_group(), Some("g2"));
    c.set_view_mode(ViewMode::Flat, &mut store);
    assert_eq!(c.grouped().expanded_group(), None);
    assert_eq!(c.grouped().selected_index_in_group(), None);
}

#[test]
fn toggling_view_mode_resets_selection_and_expand_all() {
    let (mut c, mut store) = mounted();
    c.select_row(2, ClickModifier::None);
    c.toggle_expand_all();
    c.toggle_view_mode(&mut store);
    assert!(c.selection().is_empty());
    assert!(!c.expand_all());
}

#[test]
fn only_one_group_expanded_at_a_time() {
    let (mut c, mut store) = mounted();
    c.set_view_mode(ViewMode::Grouped, &mut store);
    assert!(!c.expand_all());
    assert!(c.expand_group("g1"));
    assert!(c.is_group_expanded("g1"));
    assert!(c.expand_group("g2"));
    assert!(!c.is_group_expanded("g1"));
    assert!(c.is_group_expanded("g2"));
}

#[test]
fn expand_all_expands_everything_and_locks_toggles() {
    let (mut c, mut store) = mounted();
    c.set_view_mode(ViewMode::Grouped, &mut store);
    c.expand_group("g1");
    c.toggle_expand_all();
    assert!(c.is_group_expanded("g1"));
    assert!(c.is_group_expanded("g2"));
    assert!(!c.expand_group("g2"));
    assert!(!c.collapse_group());
    c.toggle_expand_all();
    assert!(c.is_group_expanded("g1"));
    assert!(!c.is_group_expanded("g2"));
}

#[test]
fn unknown_group_is_rejected() {
    let (mut c, _) = mounted();
    assert!(!c.expand_group("nope"));
    assert!(!c.select_grouped_row("nope", 0));
    assert!(!c.select_grouped_row("g1", 2));
}

#[test]
fn grouped_rows_account_for_expansion() {
    let (mut c, mut store) = mounted();
    c.set_view_mode(ViewMode::Grouped, &mut store);
    assert_eq!(c.grouped_row_count(), 2);
    c.expand_group("g1");
    assert_eq!(c.grouped_row_count(), 4);
    assert_eq!(c.group_row_offset("g2"), Some(3));
    c.toggle_expand_all();
    assert_eq!(c.grouped_row_count(), 7);
}

// ---------------------------------------------------------------------------
// Reveal (auto-expand-and-scroll)
// ---------------------------------------------------------------------------

#[test]
fn reveal_from_flat_switches_expands_and_scrolls() {
    let (mut c, mut store) = mounted();
    c.reveal_recording("g2", &mut store);
    assert_eq!(c.view_mode(), ViewMode::Grouped);
    assert_eq!(c.grouped().expanded_group(), Some("g2"));
    assert!(c.is_group_expanded("g2"));
    assert_eq!(c.grouped_scroll(), 1);
    assert_eq!(store.get(VIEW_MODE_KEY).as_deref(), Some("true"));
}

#[test]
fn reveal_in_grouped_scrolls_directly() {
    let (mut c, mut store) = mounted();
    c.set_view_mode(ViewMode::Grouped, &mut store);
    c.reveal_recording("g1", &mut store);
    assert_eq!(c.grouped().expanded_group(), Some("g1"));
    assert_eq!(c.grouped_scroll(), 0);
    c.reveal_recording("g2", &mut store);
    assert_eq!(c.grouped().expanded_group(), Some("g2"));
    assert_eq!(c.grouped_scroll(), 1);
}

#[test]
fn plain_switch_to_grouped_does_not_expand() {
    let (mut c, mut store) = mounted();
    c.set_view_mode(ViewMode::Grouped, &mut store);
    assert!(c.grouped().is_empty());
    assert_eq!(c.grouped_scroll(), 0);
}

// ---------------------------------------------------------------------------
// Sort and search
// ---------------------------------------------------------------------------

#[test]
fn sort_clears_selection_and_flips() {
    let (mut c, _) = mounted();
    c.select_row(0, ClickModifier::None);
    c.sort(SortColumn::Timestamp);
    assert!(c.selection().is_empty());
    assert_eq!(c.sort_by().direction, SortDirection::Desc);
    assert_eq!(c.pages()[0].id, "p5");
    c.sort(SortColumn::Title);
    assert_eq!(c.sort_by().direction, SortDirection::Asc);
    assert_eq!(c.pages()[0].id, "p1");
}

#[test]
fn search_from_grouped_switches_to_flat() {
    let (mut c, mut store) = mounted();
    c.set_view_mode(ViewMode::Grouped, &mut store);
    c.search("p3", &mut store);
    assert_eq!(c.view_mode(), ViewMode::Flat);
    assert_eq!(c.pages().len(), 1);
    assert_eq!(c.displayed_len(), 1);
    c.search("", &mut store);
    assert_eq!(c.pages().len(), 5);
}

#[test]
fn search_resets_selection() {
    let (mut c, mut store) = mounted();
    c.select_row(4, ClickModifier::None);
    c.search("Page", &mut store);
    assert!(c.selection().is_empty());
}

// ---------------------------------------------------------------------------
// Bookmark list reorder and save
// ---------------------------------------------------------------------------

fn bookmark_ids(c: &Controller) -> Vec<&str> {
    c.active_bookmarks().iter().map(|b| b.id.as_str()).collect()
}

#[test]
fn open_list_switches_table_rows() {
    let (mut c, _) = mounted();
    assert!(c.open_list(Some("l1")));
    assert_eq!(c.displayed_len(), 4);
    assert!(c.select_row(3, ClickModifier::None));
    assert!(c.selected_pages().is_empty());
    assert!(!c.open_list(Some("missing")));
    assert!(c.open_list(None));
    assert_eq!(c.displayed_len(), 5);
}

#[test]
fn move_then_save_sends_local_order() {
    let (mut c, _) = mounted();
    c.open_list(Some("l1"));
    assert!(c.move_bookmark(2, 0));
    assert_eq!(bookmark_ids(&c), vec!["C", "A", "B", "D"]);

    let mut backend = RecordingBackend::default();
    c.save_order(&mut backend).unwrap();
    c.save_order(&mut backend).unwrap();
    let saved = backend.saved.borrow();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[1].0, "l1");
    assert_eq!(saved[1].1, vec!["C", "A", "B", "D"]);
    assert_eq!(bookmark_ids(&c), vec!["C", "A", "B", "D"]);
    assert!(!c.active_list().unwrap().has_unsaved_changes());
}

#[test]
fn failed_save_keeps_local_order() {
    let (mut c, _) = mounted();
    c.open_list(Some("l1"));
    c.move_bookmark(0, 3);
    let mut backend = RecordingBackend {
        fail: true,
        ..Default::default()
    };
    assert!(c.save_order(&mut backend).is_err());
    assert_eq!(bookmark_ids(&c), vec!["B", "C", "D", "A"]);
    assert!(c.active_list().unwrap().has_unsaved_changes());
}

#[test]
fn move_without_open_list_is_rejected() {
    let (mut c, _) = mounted();
    assert!(!c.move_bookmark(0, 1));
    let mut backend = RecordingBackend::default();
    c.save_order(&mut backend).unwrap();
    assert!(backend.saved.borrow().is_empty());
}

#[test]
fn reload_with_same_list_keeps_local_order() {
    let (mut c, _) = mounted();
    c.open_list(Some("l1"));
    c.move_bookmark(3, 0);
    c.replace_collection(sample_collection());
    assert_eq!(bookmark_ids(&c), vec!["D", "A", "B", "C"]);
}

#[test]
fn reload_with_changed_list_replaces_local_order() {
    let (mut c, _) = mounted();
    c.open_list(Some("l1"));
    c.move_bookmark(3, 0);
    let mut coll = sample_collection();
    coll.lists[0].bookmarks.push(bookmark("E"));
    coll.lists[0].revision = 2;
    c.replace_collection(coll);
    assert_eq!(bookmark_ids(&c), vec!["A", "B", "C", "D", "E"]);
}

#[test]
fn reload_without_open_list_closes_it() {
    let (mut c, _) = mounted();
    c.open_list(Some("l1"));
    let mut coll = sample_collection();
    coll.lists.clear();
    c.replace_collection(coll);
    assert!(c.active_list().is_none());
    assert_eq!(c.displayed_len(), 5);
}

// ---------------------------------------------------------------------------
// Recording deletion
// ---------------------------------------------------------------------------

#[test]
fn delete_recording_drops_group_and_pages() {
    let (mut c, _) = mounted();
    c.select_grouped_row("g2", 1);
    let mut backend = RecordingBackend::default();
    assert_eq!(c.delete_recording("g2", &mut backend).unwrap(), 3);
    assert_eq!(backend.deleted, vec!["g2"]);
    let groups: Vec<&str> = c.groups().iter().map(|g| g.id()).collect();
    assert_eq!(groups, vec!["g1"]);
    let pages: Vec<&str> = c.pages().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(pages, vec!["p1", "p2"]);
    assert!(c.grouped().is_empty());
}

#[test]
fn failed_delete_keeps_recording() {
    let (mut c, _) = mounted();
    c.select_row(0, ClickModifier::None);
    let mut backend = RecordingBackend {
        fail: true,
        ..Default::default()
    };
    assert!(c.delete_recording("g1", &mut backend).is_err());
    assert_eq!(c.groups().len(), 2);
    assert_eq!(c.pages().len(), 5);
    assert_eq!(c.selection(), &Selection::Single(0));
}

// ---------------------------------------------------------------------------
// Loads
// ---------------------------------------------------------------------------

#[test]
fn current_load_is_applied() {
    let (mut c, _) = mounted();
    c.select_row(0, ClickModifier::None);
    let ticket = c.begin_load();
    let mut coll = sample_collection();
    coll.pages.truncate(2);
    assert!(c.finish_load(&ticket, coll));
    assert_eq!(c.pages().len(), 2);
    assert!(c.selection().is_empty());
}

#[test]
fn load_after_unmount_is_discarded() {
    let (mut c, _) = mounted();
    let ticket = c.begin_load();
    c.unmount();
    let mut coll = sample_collection();
    coll.pages.clear();
    assert!(!c.finish_load(&ticket, coll));
    assert_eq!(c.pages().len(), 5);
}

#[test]
fn load_for_previous_list_is_discarded() {
    let (mut c, _) = mounted();
    c.open_list(Some("l1"));
    let ticket = c.begin_load();
    c.open_list(None);
    assert!(!c.finish_load(&ticket, sample_collection()));
}

#[test]
fn superseded_load_is_discarded() {
    let (mut c, _) = mounted();
    let old = c.begin_load();
    let new = c.begin_load();
    assert!(!c.finish_load(&old, sample_collection()));
    assert!(c.finish_load(&new, sample_collection()));
}

// ---------------------------------------------------------------------------
// Keys and timers
// ---------------------------------------------------------------------------

#[test]
fn automation_combo_opens_once() {
    let (mut c, _) = mounted();
    let t0 = Instant::now();
    let ms = Duration::from_millis(1);
    let opened: Vec<bool> = [91u16, 16, 65]
        .iter()
        .enumerate()
        .map(|(i, &code)| c.press_key(code, t0 + ms * (i as u32 * 100)))
        .collect();
    assert_eq!(opened, vec![false, false, true]);
    assert!(!c.press_key(65, t0 + ms * 300));
}

#[test]
fn near_miss_combo_and_buffer_reset() {
    let (mut c, _) = mounted();
    let t0 = Instant::now();
    let ms = Duration::from_millis(1);
    assert!(!c.press_key(91, t0));
    assert!(!c.press_key(16, t0 + ms * 100));
    assert!(!c.press_key(66, t0 + ms * 200));
    c.tick(t0 + ms * 1199);
    assert_eq!(c.key_buffer().len(), 3);
    c.tick(t0 + ms * 1200);
    assert!(c.key_buffer().is_empty());
}

#[test]
fn combo_after_quiet_second_matches_without_tick() {
    let (mut c, _) = mounted();
    let t0 = Instant::now();
    let t1 = t0 + Duration::from_millis(1020);
    assert!(!c.press_key(66, t0));
    assert!(!c.press_key(91, t1));
    assert!(!c.press_key(16, t1));
    assert!(c.press_key(65, t1));
}

#[test]
fn keys_ignored_after_unmount() {
    let (mut c, _) = mounted();
    let t0 = Instant::now();
    c.press_key(91, t0);
    c.unmount();
    assert!(c.key_buffer().is_empty());
    assert!(!c.press_key(91, t0));
    assert!(!c.press_key(16, t0));
    assert!(!c.press_key(65, t0));
}

#[test]
fn scroll_condenses_header_after_settling() {
    let (mut c, _) = mounted();
    let t0 = Instant::now();
    c.on_scroll(
        ScrollMetrics {
            client_height: 10,
            scroll_height: 40,
            scroll_top: 8,
        },
        t0,
    );
    assert!(!c.is_condensed());
    assert!(c.tick(t0 + Duration::from_millis(60)));
    assert!(c.is_condensed());
}
