use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use regex::Regex;

use crate::model::{Item, SortColumn, SortDirection, display_timestamp};
use crate::tui::app::{App, Mode};

use super::helpers::{fit, pad_to};
use super::push_highlighted_spans;

/// Width of the cursor bar plus selection marker
const MARKER_W: usize = 3;
const TIMESTAMP_W: usize = 19;
const BROWSER_W: usize = 12;
const GAP: usize = 2;

/// Column widths of the table for a given terminal width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    timestamp: usize,
    title: usize,
    url: usize,
    browser: usize,
}

impl Columns {
    fn layout(width: usize, with_browser: bool) -> Self {
        let browser = if with_browser { BROWSER_W } else { 0 };
        let fixed = MARKER_W + TIMESTAMP_W + GAP * 3 + browser;
        let rest = width.saturating_sub(fixed);
        let title = rest / 2;
        Columns {
            timestamp: TIMESTAMP_W,
            title,
            url: rest - title,
            browser,
        }
    }
}

fn column_header(app: &App, cols: Columns, width: usize, sorted: bool) -> Line<'static> {
    let bg = app.theme.background;
    let sort = app.controller.sort_by();
    let label = |column: SortColumn, w: usize| {
        let mut text = column.label().to_uppercase();
        if sorted && sort.column == column {
            text.push(' ');
            text.push_str(match sort.direction {
                SortDirection::Asc => "\u{25B2}",
                SortDirection::Desc => "\u{25BC}",
            });
        }
        fit(&text, w)
    };
    let style = Style::default()
        .fg(app.theme.dim)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let gap = " ".repeat(GAP);
    let mut text = " ".repeat(MARKER_W);
    text.push_str(&label(SortColumn::Timestamp, cols.timestamp));
    text.push_str(&gap);
    text.push_str(&label(SortColumn::Title, cols.title));
    text.push_str(&gap);
    text.push_str(&label(SortColumn::Url, cols.url));
    if cols.browser > 0 {
        text.push_str(&gap);
        text.push_str(&label(SortColumn::Browser, cols.browser));
    }
    let mut spans = vec![Span::styled(text, style)];
    pad_to(&mut spans, width, style);
    Line::from(spans)
}

struct RowState {
    is_cursor: bool,
    is_selected: bool,
    is_moving: bool,
}

fn item_row<I: Item>(
    app: &App,
    item: &I,
    state: RowState,
    cols: Columns,
    width: usize,
    search_re: Option<&Regex>,
) -> Line<'static> {
    let bg = if state.is_cursor {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let base = Style::default().bg(bg);
    let match_style = Style::default()
        .fg(app.theme.search_match_fg)
        .bg(app.theme.search_match_bg);

    let mut spans: Vec<Span<'static>> = Vec::new();
    if state.is_cursor {
        spans.push(Span::styled(
            "\u{258E}",
            Style::default().fg(app.theme.selection_border).bg(bg),
        ));
    } else {
        spans.push(Span::styled(" ", base));
    }
    let marker = if state.is_moving {
        Span::styled("\u{2195}", base.fg(app.theme.highlight))
    } else if state.is_selected {
        Span::styled("\u{25CF}", base.fg(app.theme.selected))
    } else {
        Span::styled(" ", base)
    };
    spans.push(marker);
    spans.push(Span::styled(" ", base));

    let title_fg = if state.is_moving {
        app.theme.highlight
    } else if state.is_selected {
        app.theme.selected
    } else {
        app.theme.text_bright
    };
    let mut title_style = base.fg(title_fg);
    if state.is_cursor {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }
    let gap = Span::styled(" ".repeat(GAP), base);

    spans.push(Span::styled(
        fit(&display_timestamp(item.timestamp()), cols.timestamp),
        base.fg(app.theme.dim),
    ));
    spans.push(gap.clone());
    push_highlighted_spans(
        &mut spans,
        &fit(item.title(), cols.title),
        title_style,
        match_style,
        search_re,
    );
    spans.push(gap.clone());
    push_highlighted_spans(
        &mut spans,
        &fit(item.url(), cols.url),
        base.fg(app.theme.text),
        match_style,
        search_re,
    );
    if cols.browser > 0 {
        spans.push(gap);
        spans.push(Span::styled(
            fit(item.browser().unwrap_or(""), cols.browser),
            base.fg(app.theme.cyan),
        ));
    }
    pad_to(&mut spans, width, base);
    Line::from(spans)
}

fn empty_message(frame: &mut Frame, app: &App, area: Rect, text: &str) {
    let empty = Paragraph::new(format!(" {}", text))
        .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    frame.render_widget(empty, area);
}

/// Render the flat table: the collection's pages, or the bookmarks of the
/// open list.
pub fn render_page_table(frame: &mut Frame, app: &mut App, area: Rect) {
    app.table_area = Some(area);
    app.table_height = area.height.saturating_sub(1) as usize;
    let app: &App = app;

    let width = area.width as usize;
    let visible = app.table_height;
    let scroll = app.scroll_offset;
    let search_re = app.active_search_re();
    let c = &app.controller;

    let mut lines: Vec<Line> = Vec::with_capacity(visible + 1);
    match c.active_list() {
        Some(order) => {
            if order.is_empty() {
                empty_message(frame, app, area, "List is empty");
                return;
            }
            let with_browser = order.bookmarks().iter().any(|b| b.browser.is_some());
            let cols = Columns::layout(width, with_browser);
            lines.push(column_header(app, cols, width, false));
            for (i, bm) in order.bookmarks().iter().enumerate().skip(scroll).take(visible) {
                let is_cursor = i == app.cursor;
                let state = RowState {
                    is_cursor,
                    is_selected: c.is_selected(i),
                    is_moving: is_cursor && app.mode == Mode::Move,
                };
                lines.push(item_row(app, bm, state, cols, width, None));
            }
        }
        None => {
            if c.pages().is_empty() {
                let text = if c.search_text().is_empty() {
                    "No pages".to_string()
                } else {
                    format!("No pages match /{}", c.search_text())
                };
                empty_message(frame, app, area, &text);
                return;
            }
            let with_browser = c.pages().iter().any(|p| p.browser.is_some());
            let cols = Columns::layout(width, with_browser);
            lines.push(column_header(app, cols, width, true));
            for (i, page) in c.pages().iter().enumerate().skip(scroll).take(visible) {
                let state = RowState {
                    is_cursor: i == app.cursor,
                    is_selected: c.is_selected(i),
                    is_moving: false,
                };
                lines.push(item_row(app, page, state, cols, width, search_re.as_ref()));
            }
        }
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);
}
