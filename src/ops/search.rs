use regex::Regex;

use crate::model::{Item, Page};

/// Build a case-insensitive matcher for a search query. Queries that
/// aren't valid regexes are matched literally.
pub fn query_regex(query: &str) -> Option<Regex> {
    if query.trim().is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", query))
        .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(query))))
        .ok()
}

pub fn matches<I: Item>(item: &I, re: &Regex) -> bool {
    re.is_match(item.title()) || re.is_match(item.url())
}

/// Pages whose title or URL matches `query`, in their current order.
/// An empty query matches everything.
pub fn search_pages(pages: &[Page], query: &str) -> Vec<Page> {
    match query_regex(query) {
        Some(re) => pages.iter().filter(|p| matches(*p, &re)).cloned().collect(),
        None => pages.to_vec(),
    }
}
