use std::cmp::Ordering;

use crate::model::{Item, Page, SortBy, SortColumn, SortDirection};

/// The sort that clicking `column`'s header produces: a new column sorts
/// ascending, the current column flips direction.
pub fn next_sort(current: SortBy, column: SortColumn) -> SortBy {
    if current.column == column {
        SortBy {
            column,
            direction: current.direction.flipped(),
        }
    } else {
        SortBy {
            column,
            direction: SortDirection::Asc,
        }
    }
}

fn compare<I: Item>(a: &I, b: &I, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Timestamp => a.timestamp_ordinal().cmp(&b.timestamp_ordinal()),
        SortColumn::Title => a.title().to_lowercase().cmp(&b.title().to_lowercase()),
        SortColumn::Url => a.url().cmp(b.url()),
        SortColumn::Browser => a.browser().unwrap_or("").cmp(b.browser().unwrap_or("")),
    }
}

/// Stable sort; ties keep their current relative order in both directions.
pub fn sort_pages(pages: &mut [Page], sort: SortBy) {
    pages.sort_by(|a, b| {
        let ord = compare(a, b, sort.column);
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}
