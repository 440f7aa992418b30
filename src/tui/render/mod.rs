pub mod grouped_view;
pub mod header;
mod helpers;
pub mod modals;
pub mod page_table;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use regex::Regex;

use crate::controller::ViewMode;

use super::app::{App, Mode};

/// Rows of the full collection header; the condensed header takes one
pub const FULL_HEADER_HEIGHT: u16 = 3;

/// Main render function, dispatching to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let header_height = if app.controller.is_condensed() {
        1
    } else {
        FULL_HEADER_HEIGHT
    };

    // Layout: header | content | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);

    match app.controller.view_mode() {
        ViewMode::Flat => page_table::render_page_table(frame, app, chunks[1]),
        ViewMode::Grouped => grouped_view::render_grouped_view(frame, app, chunks[1]),
    }

    match app.mode {
        Mode::AddToList => modals::render_add_to_list(frame, app, area),
        Mode::Automation => modals::render_automation(frame, app, area),
        _ => {}
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

/// Push spans for text with regex match highlighting. If no regex or no matches,
/// pushes a single span with `base_style`. Otherwise splits text at match boundaries.
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let re = match search_re {
        Some(r) => r,
        None => {
            spans.push(Span::styled(text.to_string(), base_style));
            return;
        }
    };

    let mut last_end = 0;
    for m in re.find_iter(text) {
        if m.start() == m.end() {
            continue;
        }
        if m.start() > last_end {
            spans.push(Span::styled(
                text[last_end..m.start()].to_string(),
                base_style,
            ));
        }
        spans.push(Span::styled(
            text[m.start()..m.end()].to_string(),
            highlight_style,
        ));
        last_end = m.end();
    }
    if last_end < text.len() || text.is_empty() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}
