use serde::Serialize;

/// Title given to every bookmark created from a pasted link
pub const UNTITLED: &str = "Untitled Document";

/// A link to crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBookmark {
    pub url: String,
    pub title: String,
}

/// Create a list from pasted links and queue an automation over it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutomationRequest {
    pub user: String,
    pub collection: String,
    pub list_title: String,
    pub bookmarks: Vec<NewBookmark>,
}

/// One bookmark per non-blank line
pub fn parse_links(text: &str) -> Vec<NewBookmark> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|url| NewBookmark {
            url: url.to_string(),
            title: UNTITLED.to_string(),
        })
        .collect()
}

pub fn build_automation(
    user: &str,
    collection: &str,
    list_title: &str,
    links: &str,
) -> AutomationRequest {
    AutomationRequest {
        user: user.to_string(),
        collection: collection.to_string(),
        list_title: list_title.trim().to_string(),
        bookmarks: parse_links(links),
    }
}
