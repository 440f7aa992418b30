use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::page::{Bookmark, Page};

/// A recording session: the pages captured together in one browsing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Capture timestamp of the session start
    #[serde(default)]
    pub created_at: String,
}

/// A user-curated, ordered list of bookmarks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
    /// Load generation assigned by the loader. Two `List` values with the
    /// same `id` and `revision` are the same loaded list.
    #[serde(skip)]
    pub revision: u64,
}

impl List {
    /// Identity of this loaded list: `(id, revision)`
    pub fn identity(&self) -> (&str, u64) {
        (&self.id, self.revision)
    }
}

/// Lifecycle of a queued automation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationStatus {
    Queued,
    Running,
    Done,
}

impl AutomationStatus {
    pub fn label(self) -> &'static str {
        match self {
            AutomationStatus::Queued => "queued",
            AutomationStatus::Running => "running",
            AutomationStatus::Done => "done",
        }
    }

    /// Still waiting for or doing work
    pub fn is_active(self) -> bool {
        !matches!(self, AutomationStatus::Done)
    }
}

/// An automation crawl over the bookmarks of a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automation {
    pub id: String,
    pub list_id: String,
    pub status: AutomationStatus,
}

/// Column the flat page table is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    #[default]
    Timestamp,
    Title,
    Url,
    Browser,
}

impl SortColumn {
    pub const ALL: [SortColumn; 4] = [
        SortColumn::Timestamp,
        SortColumn::Title,
        SortColumn::Url,
        SortColumn::Browser,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Timestamp => "timestamp",
            SortColumn::Title => "title",
            SortColumn::Url => "url",
            SortColumn::Browser => "browser",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortColumn::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| format!("unknown sort column '{}' (timestamp, title, url, browser)", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Current sort of the flat page table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SortBy {
    #[serde(default)]
    pub column: SortColumn,
    #[serde(default)]
    pub direction: SortDirection,
}

/// A collection: pages, the recordings they were captured in, and lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub user: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub recordings: Vec<Recording>,
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub sort: SortBy,
    /// An automation has been queued and not yet picked up
    #[serde(default)]
    pub queued: bool,
    #[serde(default)]
    pub automations: Vec<Automation>,
}

impl Collection {
    pub fn find_list(&self, list_id: &str) -> Option<&List> {
        self.lists.iter().find(|l| l.id == list_id)
    }

    pub fn find_list_mut(&mut self, list_id: &str) -> Option<&mut List> {
        self.lists.iter_mut().find(|l| l.id == list_id)
    }

    /// Pages captured in the given recording, in collection order
    pub fn recording_pages<'a>(&'a self, rec_id: &'a str) -> impl Iterator<Item = &'a Page> + 'a {
        self.pages.iter().filter(move |p| p.rec == rec_id)
    }

    /// The most recently started automation
    pub fn latest_automation(&self) -> Option<&Automation> {
        self.automations.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_column_parses_labels() {
        assert_eq!("url".parse::<SortColumn>(), Ok(SortColumn::Url));
        assert!("size".parse::<SortColumn>().is_err());
    }

    #[test]
    fn sort_direction_serializes_uppercase() {
        let json = serde_json::to_string(&SortBy {
            column: SortColumn::Title,
            direction: SortDirection::Desc,
        })
        .unwrap();
        assert_eq!(json, r#"{"column":"title","direction":"DESC"}"#);
    }

    #[test]
    fn minimal_collection_uses_defaults() {
        let coll: Collection = serde_json::from_str(r#"{"id":"c","user":"u"}"#).unwrap();
        assert!(coll.pages.is_empty());
        assert!(coll.lists.is_empty());
        assert_eq!(coll.sort, SortBy::default());
        assert!(!coll.queued);
    }

    #[test]
    fn automation_status_reads_lowercase() {
        let coll: Collection = serde_json::from_str(
            r#"{"id":"c","user":"u","automations":[
                {"id":"a1","list_id":"l1","status":"done"},
                {"id":"a2","list_id":"l2","status":"running"}
            ]}"#,
        )
        .unwrap();
        let latest = coll.latest_automation().unwrap();
        assert_eq!(latest.id, "a2");
        assert_eq!(latest.status, AutomationStatus::Running);
        assert!(latest.status.is_active());
        assert!(!coll.automations[0].status.is_active());
    }

    #[test]
    fn list_revision_is_not_serialized() {
        let list = List {
            id: "l1".into(),
            title: "Reading".into(),
            bookmarks: vec![],
            revision: 7,
        };
        let json = serde_json::to_string(&list).unwrap();
        assert!(!json.contains("revision"));
        let back: List = serde_json::from_str(&json).unwrap();
        assert_eq!(back.revision, 0);
    }
}
