use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{Bookmark, Page};

/// Request to bookmark pages into one or more lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddToLists {
    pub pages: Vec<Page>,
    pub lists: Vec<String>,
}

impl AddToLists {
    /// Number of bookmarks the request creates
    pub fn bookmark_count(&self) -> usize {
        self.pages.len() * self.lists.len()
    }
}

/// Build an add-to-list request from the checked lists (in their map
/// order) and the selected pages (in selection order). Returns `None`
/// when nothing is checked or nothing is selected.
pub fn build_add_to_lists(pages: Vec<Page>, checked: &IndexMap<String, bool>) -> Option<AddToLists> {
    let lists: Vec<String> = checked
        .iter()
        .filter(|(_, on)| **on)
        .map(|(id, _)| id.clone())
        .collect();
    if lists.is_empty() || pages.is_empty() {
        return None;
    }
    Some(AddToLists { pages, lists })
}

/// Bookmark for `page`, with an ID unique among `existing`.
pub fn bookmark_from_page(page: &Page, existing: &[Bookmark]) -> Bookmark {
    Bookmark {
        id: next_bookmark_id(existing),
        page_id: Some(page.id.clone()),
        title: page.title.clone(),
        url: page.url.clone(),
        timestamp: page.timestamp.clone(),
        browser: page.browser.clone(),
    }
}

/// Next free `bN` ID
pub fn next_bookmark_id(existing: &[Bookmark]) -> String {
    let max = existing
        .iter()
        .filter_map(|b| b.id.strip_prefix('b')?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("b{}", max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(id: &str) -> Page {
        Page {
            id: id.into(),
            title: format!("Page {}", id),
            url: format!("http://example.com/{}", id),
            timestamp: "20180101000000".into(),
            rec: "r1".into(),
            browser: Some("chrome:60".into()),
        }
    }

    fn checked(entries: &[(&str, bool)]) -> IndexMap<String, bool> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn nothing_checked_is_noop() {
        assert_eq!(build_add_to_lists(vec![page("p1")], &checked(&[])), None);
        assert_eq!(
            build_add_to_lists(vec![page("p1")], &checked(&[("l1", false)])),
            None
        );
    }

    #[test]
    fn nothing_selected_is_noop() {
        assert_eq!(build_add_to_lists(vec![], &checked(&[("l1", true)])), None);
    }

    #[test]
    fn keeps_page_and_list_order() {
        let req = build_add_to_lists(
            vec![page("p3"), page("p1")],
            &checked(&[("l2", true), ("l1", false), ("l3", true)]),
        )
        .unwrap();
        let page_ids: Vec<&str> = req.pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(page_ids, vec!["p3", "p1"]);
        assert_eq!(req.lists, vec!["l2", "l3"]);
        assert_eq!(req.bookmark_count(), 4);
    }

    #[test]
    fn bookmark_ids_skip_existing() {
        let p = page("p1");
        let first = bookmark_from_page(&p, &[]);
        assert_eq!(first.id, "b1");
        assert_eq!(first.page_id.as_deref(), Some("p1"));
        assert_eq!(first.browser.as_deref(), Some("chrome:60"));
        let mut custom = first.clone();
        custom.id = "imported".into();
        let second = bookmark_from_page(&p, &[first, custom]);
        assert_eq!(second.id, "b2");
    }
}
