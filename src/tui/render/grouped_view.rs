use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::display_timestamp;
use crate::tui::app::{App, GroupedRow, grouped_rows};

use super::helpers::{fit, pad_to};

/// Render pages grouped under their recordings
pub fn render_grouped_view(frame: &mut Frame, app: &mut App, area: Rect) {
    app.table_area = Some(area);
    app.table_height = area.height as usize;
    let app: &App = app;
    let c = &app.controller;

    if c.groups().is_empty() {
        let empty = Paragraph::new(" No recordings")
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width as usize;
    let rows = grouped_rows(c);
    let mut lines: Vec<Line> = Vec::new();

    for (row_idx, row) in rows
        .iter()
        .enumerate()
        .skip(c.grouped_scroll())
        .take(app.table_height)
    {
        let is_cursor = row_idx == app.grouped_cursor;
        let bg = if is_cursor {
            app.theme.selection_bg
        } else {
            app.theme.background
        };
        let base = Style::default().bg(bg);

        let mut spans: Vec<Span> = Vec::new();
        if is_cursor {
            spans.push(Span::styled(
                "\u{258E}",
                Style::default().fg(app.theme.selection_border).bg(bg),
            ));
        } else {
            spans.push(Span::styled(" ", base));
        }

        match *row {
            GroupedRow::Header { group } => {
                let g = &c.groups()[group];
                let expanded = c.is_group_expanded(g.id());
                let arrow = if expanded { "\u{25BE}" } else { "\u{25B8}" };
                let title = if g.recording.title.is_empty() {
                    g.id()
                } else {
                    g.recording.title.as_str()
                };
                let title_fg = if c.grouped().has_active_page(g.id()) {
                    app.theme.selected
                } else {
                    app.theme.text_bright
                };
                spans.push(Span::styled(format!("{} ", arrow), base.fg(app.theme.highlight)));
                spans.push(Span::styled(
                    title.to_string(),
                    base.fg(title_fg).add_modifier(Modifier::BOLD),
                ));
                let plural = if g.pages.len() == 1 { "" } else { "s" };
                spans.push(Span::styled(
                    format!("  {} page{}", g.pages.len(), plural),
                    base.fg(app.theme.dim),
                ));
                if !g.recording.created_at.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", display_timestamp(&g.recording.created_at)),
                        base.fg(app.theme.dim),
                    ));
                }
            }
            GroupedRow::Page { group, index } => {
                let g = &c.groups()[group];
                let page = &g.pages[index];
                let selected = c.grouped().is_row_selected(g.id(), index);
                let (marker, title_fg) = if selected {
                    ("\u{25CF}", app.theme.selected)
                } else {
                    (" ", app.theme.text_bright)
                };
                spans.push(Span::styled(format!("   {} ", marker), base.fg(app.theme.selected)));
                let avail = width.saturating_sub(6 + 2 + 19 + 2);
                let title_w = avail / 2;
                spans.push(Span::styled(fit(&page.title, title_w), base.fg(title_fg)));
                spans.push(Span::styled("  ", base));
                spans.push(Span::styled(
                    fit(&page.url, avail - title_w),
                    base.fg(app.theme.text),
                ));
                spans.push(Span::styled("  ", base));
                spans.push(Span::styled(
                    display_timestamp(&page.timestamp),
                    base.fg(app.theme.dim),
                ));
            }
        }
        pad_to(&mut spans, width, base);
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);
}
