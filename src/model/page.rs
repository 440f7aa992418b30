use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of webrecorder capture timestamps (`20180523101500`)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// A row that can be displayed, selected and ordered in a table view.
pub trait Item {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn url(&self) -> &str;
    fn timestamp(&self) -> &str;
    fn browser(&self) -> Option<&str>;

    /// Numeric value of the 14-digit timestamp, used for ordering.
    /// Malformed timestamps order first.
    fn timestamp_ordinal(&self) -> u64 {
        self.timestamp().parse().unwrap_or(0)
    }
}

/// A captured page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub url: String,
    pub timestamp: String,
    /// Owning recording ID
    pub rec: String,
    /// Remote browser used for the capture, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
}

/// A page reference inside a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    /// The page this bookmark was created from, if it came from the collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
}

impl Item for Page {
    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn url(&self) -> &str {
        &self.url
    }
    fn timestamp(&self) -> &str {
        &self.timestamp
    }
    fn browser(&self) -> Option<&str> {
        self.browser.as_deref()
    }
}

impl Item for Bookmark {
    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn url(&self) -> &str {
        &self.url
    }
    fn timestamp(&self) -> &str {
        &self.timestamp
    }
    fn browser(&self) -> Option<&str> {
        self.browser.as_deref()
    }
}

/// Render a capture timestamp as `YYYY-MM-DD hh:mm:ss`, or return it
/// unchanged when it isn't in webrecorder form.
pub fn display_timestamp(ts: &str) -> String {
    match NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => ts.to_string(),
    }
}
