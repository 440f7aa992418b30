use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::controller::ViewMode;
use crate::model::SortDirection;
use crate::tui::app::App;

use super::helpers::pad_to;

fn view_label(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::Flat => "[flat]",
        ViewMode::Grouped => "[grouped]",
    }
}

/// What the content area shows right now: an open list, a search, or
/// the page sort.
fn context_spans<'a>(app: &App, style: Style, warn: Style) -> Vec<Span<'a>> {
    let c = &app.controller;
    let mut spans = Vec::new();
    if let Some(order) = c.active_list() {
        let title = c
            .collection()
            .find_list(order.list_id())
            .map_or(order.list_id(), |l| l.title.as_str());
        spans.push(Span::styled(
            format!("list: {} ({} bookmarks)", title, order.len()),
            style,
        ));
        if order.has_unsaved_changes() {
            spans.push(Span::styled("  unsaved order".to_string(), warn));
        }
    } else if c.view_mode() == ViewMode::Grouped {
        let label = if c.expand_all() { "all expanded" } else { "by recording" };
        spans.push(Span::styled(label.to_string(), style));
    } else {
        let sort = c.sort_by();
        let arrow = match sort.direction {
            SortDirection::Asc => "\u{25B2}",
            SortDirection::Desc => "\u{25BC}",
        };
        spans.push(Span::styled(format!("sorted by {} {}", sort.column, arrow), style));
        if !c.search_text().is_empty() {
            spans.push(Span::styled(
                format!("  /{}  {} matches", c.search_text(), c.pages().len()),
                style,
            ));
        }
    }
    match c.collection().latest_automation() {
        Some(automation) => {
            let label = format!("  automation {}", automation.status.label());
            let style = if automation.status.is_active() { warn } else { style };
            spans.push(Span::styled(label, style));
        }
        None if c.collection().queued => {
            spans.push(Span::styled("  automation queued".to_string(), warn));
        }
        None => {}
    }
    if c.is_loading() {
        spans.push(Span::styled("  loading\u{2026}".to_string(), style));
    }
    spans
}

/// Render the collection header: three rows normally, one when the
/// table has been scrolled far enough to condense it.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let coll = app.controller.collection();

    let title = if coll.title.is_empty() {
        coll.id.as_str()
    } else {
        coll.title.as_str()
    };
    let title_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let text = Style::default().fg(app.theme.text).bg(bg);
    let warn = Style::default().fg(app.theme.yellow).bg(bg);
    let mode = view_label(app.controller.view_mode());

    let lines: Vec<Line> = if app.controller.is_condensed() {
        let mut spans = vec![
            Span::styled(format!(" {}", title), title_style),
            Span::styled(format!(" {}  ", mode), dim),
        ];
        spans.extend(context_spans(app, dim, warn));
        pad_to(&mut spans, width, dim);
        vec![Line::from(spans)]
    } else {
        let mut top = vec![Span::styled(format!(" {}", title), title_style)];
        let right = format!("{} ", mode);
        let used: usize = top.iter().map(|s| s.content.chars().count()).sum();
        let right_len = right.chars().count();
        if used + right_len < width {
            top.push(Span::styled(" ".repeat(width - used - right_len), dim));
            top.push(Span::styled(right, text));
        }

        let counts = format!(
            " {}/{}  \u{00B7}  {} pages  \u{00B7}  {} recordings  \u{00B7}  {} lists",
            coll.user,
            coll.id,
            coll.pages.len(),
            coll.recordings.len(),
            coll.lists.len()
        );
        let mut context = vec![Span::styled(" ".to_string(), text)];
        context.extend(context_spans(app, text, warn));

        vec![
            Line::from(top),
            Line::from(Span::styled(counts, dim)),
            Line::from(context),
        ]
    };

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::scroll::ScrollMetrics;
    use crate::model::{Automation, AutomationStatus};
    use crate::tui::render::test_helpers::*;
    use std::time::{Duration, Instant};

    #[test]
    fn full_header_shows_counts_and_sort() {
        let app = sample_app();
        let output = render_to_string(TERM_W, 3, |frame, area| {
            render_header(frame, &app, area);
        });
        assert!(output.lines().next().unwrap().starts_with(" My Web Archive"));
        assert!(output.contains("[flat]"));
        assert!(output.contains("alice/web"));
        assert!(output.contains("5 pages"));
        assert!(output.contains("2 recordings"));
        assert!(output.contains("sorted by timestamp \u{25B2}"));
    }

    #[test]
    fn header_condenses_after_scroll() {
        let mut app = sample_app();
        let t0 = Instant::now();
        app.controller.on_scroll(
            ScrollMetrics {
                client_height: 10,
                scroll_height: 40,
                scroll_top: 12,
            },
            t0,
        );
        app.controller.tick(t0 + Duration::from_millis(50));
        let output = render_to_string(TERM_W, 3, |frame, area| {
            render_header(frame, &app, area);
        });
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("My Web Archive [flat]"));
    }

    #[test]
    fn header_marks_unsaved_list_order() {
        let mut app = sample_app();
        app.controller.open_list(Some("l1"));
        app.controller.move_bookmark(0, 2);
        let output = render_to_string(TERM_W, 3, |frame, area| {
            render_header(frame, &app, area);
        });
        assert!(output.contains("list: Reading (3 bookmarks)"));
        assert!(output.contains("unsaved order"));
    }

    #[test]
    fn header_shows_latest_automation_status() {
        let mut collection = sample_collection();
        collection.queued = true;
        collection.automations = vec![
            Automation {
                id: "a1".into(),
                list_id: "l1".into(),
                status: AutomationStatus::Done,
            },
            Automation {
                id: "a2".into(),
                list_id: "l1".into(),
                status: AutomationStatus::Running,
            },
        ];
        let mut app = sample_app();
        app.controller.replace_collection(collection);
        let output = render_to_string(TERM_W, 3, |frame, area| {
            render_header(frame, &app, area);
        });
        assert!(output.contains("automation running"));
        assert!(!output.contains("automation queued"));
    }
}
