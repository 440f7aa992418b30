use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::controller::Group;
use crate::model::{Bookmark, List, Page, display_timestamp};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct PageJson {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub url: String,
    pub timestamp: String,
    pub rec: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
}

#[derive(Serialize)]
pub struct RecordingJson {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created_at: String,
    pub pages: Vec<String>,
}

#[derive(Serialize)]
pub struct ListJson {
    pub id: String,
    pub title: String,
    pub bookmarks: usize,
}

#[derive(Serialize)]
pub struct BookmarkJson {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
}

#[derive(Serialize)]
pub struct ViewJson {
    pub view: &'static str,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn page_to_json(index: usize, page: &Page) -> PageJson {
    PageJson {
        index,
        id: page.id.clone(),
        title: page.title.clone(),
        url: page.url.clone(),
        timestamp: page.timestamp.clone(),
        rec: page.rec.clone(),
        browser: page.browser.clone(),
    }
}

pub fn group_to_json(group: &Group) -> RecordingJson {
    RecordingJson {
        id: group.recording.id.clone(),
        title: group.recording.title.clone(),
        created_at: group.recording.created_at.clone(),
        pages: group.pages.iter().map(|p| p.id.clone()).collect(),
    }
}

pub fn list_to_json(list: &List) -> ListJson {
    ListJson {
        id: list.id.clone(),
        title: list.title.clone(),
        bookmarks: list.bookmarks.len(),
    }
}

pub fn bookmark_to_json(index: usize, bookmark: &Bookmark) -> BookmarkJson {
    BookmarkJson {
        index,
        id: bookmark.id.clone(),
        title: bookmark.title.clone(),
        url: bookmark.url.clone(),
        timestamp: bookmark.timestamp.clone(),
        page_id: bookmark.page_id.clone(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Pad `s` with spaces to `width` display columns
fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(w)))
}

fn title_or_url<'a>(title: &'a str, url: &'a str) -> &'a str {
    if title.is_empty() { url } else { title }
}

/// Display width of the widest title, for aligning URL columns
pub fn title_width<'a>(titles: impl Iterator<Item = &'a str>) -> usize {
    titles.map(UnicodeWidthStr::width).max().unwrap_or(0).min(48)
}

/// `  3  2018-05-01 10:00:00  Title   url`
pub fn format_page_line(index: usize, page: &Page, title_w: usize) -> String {
    let mut line = format!(
        "{:>3}  {}  {}  {}",
        index,
        display_timestamp(&page.timestamp),
        pad(title_or_url(&page.title, &page.url), title_w),
        page.url
    );
    if let Some(browser) = &page.browser {
        line.push_str(&format!("  [{}]", browser));
    }
    line
}

pub fn format_bookmark_line(index: usize, bookmark: &Bookmark, title_w: usize) -> String {
    format!(
        "{:>3}  {}  {}  {}",
        index,
        pad(&bookmark.id, 6),
        pad(title_or_url(&bookmark.title, &bookmark.url), title_w),
        bookmark.url
    )
}

/// Recording header followed by its pages, indented
pub fn format_recording(group: &Group) -> Vec<String> {
    let title = if group.recording.title.is_empty() {
        group.id()
    } else {
        group.recording.title.as_str()
    };
    let plural = if group.pages.len() == 1 { "" } else { "s" };
    let mut header = format!("{}  {}  ({} page{})", group.id(), title, group.pages.len(), plural);
    if !group.recording.created_at.is_empty() {
        header.push_str(&format!("  {}", display_timestamp(&group.recording.created_at)));
    }
    let mut lines = vec![header];
    for page in &group.pages {
        lines.push(format!(
            "    {}  {}",
            display_timestamp(&page.timestamp),
            title_or_url(&page.title, &page.url)
        ));
    }
    lines
}

pub fn format_list_line(list: &List, id_w: usize) -> String {
    let plural = if list.bookmarks.len() == 1 { "" } else { "s" };
    format!(
        "{}  {}  ({} bookmark{})",
        pad(&list.id, id_w),
        title_or_url(&list.title, &list.id),
        list.bookmarks.len(),
        plural
    )
}
