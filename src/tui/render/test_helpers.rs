use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::model::{Bookmark, Collection, List, Page, Recording, SortBy};
use crate::tui::app::App;
use crate::tui::app::test_support::app_for;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

fn page(id: &str, title: &str, url: &str, ts: &str, rec: &str) -> Page {
    Page {
        id: id.into(),
        title: title.into(),
        url: url.into(),
        timestamp: ts.into(),
        rec: rec.into(),
        browser: None,
    }
}

fn bookmark(id: &str, title: &str) -> Bookmark {
    Bookmark {
        id: id.into(),
        page_id: None,
        title: title.into(),
        url: format!("http://example.com/{}", id),
        timestamp: "20180502120000".into(),
        browser: None,
    }
}

/// Two recordings (2 and 3 pages) and two lists, one of them empty.
pub fn sample_collection() -> Collection {
    let mut news = page(
        "p4",
        "News",
        "https://news.ycombinator.com/",
        "20180501200000",
        "r2",
    );
    news.browser = Some("chrome:60".into());
    Collection {
        id: "web".into(),
        user: "alice".into(),
        title: "My Web Archive".into(),
        pages: vec![
            page("p1", "Rust Blog", "https://blog.rust-lang.org/", "20180501100000", "r1"),
            page("p2", "Example", "http://example.com/", "20180501110000", "r1"),
            page("p3", "Docs", "https://docs.rs/", "20180501190000", "r2"),
            news,
            page("p5", "Wiki", "https://en.wikipedia.org/", "20180501210000", "r2"),
        ],
        recordings: vec![
            Recording {
                id: "r1".into(),
                title: "Morning session".into(),
                created_at: "20180501090000".into(),
            },
            Recording {
                id: "r2".into(),
                title: "Evening session".into(),
                created_at: "20180501180000".into(),
            },
        ],
        lists: vec![
            List {
                id: "l1".into(),
                title: "Reading".into(),
                bookmarks: vec![
                    bookmark("b1", "Bookmark A"),
                    bookmark("b2", "Bookmark B"),
                    bookmark("b3", "Bookmark C"),
                ],
                revision: 1,
            },
            List {
                id: "l2".into(),
                title: "Later".into(),
                bookmarks: vec![],
                revision: 1,
            },
        ],
        sort: SortBy::default(),
        queued: false,
        automations: vec![],
    }
}

/// A mounted app over [`sample_collection`]
pub fn sample_app() -> App {
    app_for(sample_collection()).0
}
