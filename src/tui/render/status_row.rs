use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::controller::ViewMode;
use crate::tui::app::{App, Mode};

use super::helpers::spans_width;

fn key_hints(app: &App) -> &'static str {
    match (app.mode, app.controller.view_mode()) {
        (Mode::Move, _) => "j/k move  Enter save  Esc done",
        (_, ViewMode::Grouped) => "Enter open  e expand all  D delete  v flat  q quit",
        _ if app.controller.active_list().is_some() => "m move  s save  d remove  l next list",
        _ => "space select  x toggle  X range  a add  / search  v grouped",
    }
}

/// Right-align `hint` after `spans` when it fits
fn push_hint(spans: &mut Vec<Span<'_>>, hint: &str, width: usize, style: Style, bg: Style) {
    let used = spans_width(spans);
    let hint_width = hint.chars().count();
    if used + hint_width < width {
        spans.push(Span::styled(" ".repeat(width - used - hint_width), bg));
        spans.push(Span::styled(hint.to_string(), style));
    }
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let width = area.width as usize;

    let line = match app.mode {
        Mode::Search => {
            // Search prompt: /pattern▌
            let mut spans = vec![
                Span::styled(
                    format!("/{}", app.search_input),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ];
            push_hint(&mut spans, "Enter search  Esc cancel", width, dim, bg_style);
            Line::from(spans)
        }
        Mode::ConfirmDelete => {
            let text = match &app.confirm_delete {
                Some(pending) => {
                    let name = if pending.title.is_empty() { &pending.rec_id } else { &pending.title };
                    let plural = if pending.pages == 1 { "" } else { "s" };
                    format!(" Delete {} and its {} page{}? (y/n)", name, pending.pages, plural)
                }
                None => String::new(),
            };
            Line::from(Span::styled(
                text,
                Style::default().fg(app.theme.status_color(true)).bg(bg),
            ))
        }
        _ => {
            let mut spans = Vec::new();
            if let Some(status) = &app.status {
                spans.push(Span::styled(
                    format!(" {}", status.text),
                    Style::default().fg(app.theme.status_color(status.error)).bg(bg),
                ));
            } else {
                let n = app.controller.selection().len();
                if n > 0 {
                    spans.push(Span::styled(
                        format!(" {} selected", n),
                        Style::default().fg(app.theme.selected).bg(bg),
                    ));
                }
            }
            if app.show_key_hints || app.mode == Mode::Move {
                push_hint(&mut spans, key_hints(app), width, dim, bg_style);
            }
            Line::from(spans)
        }
    };

    let paragraph = Paragraph::new(line).style(bg_style);
    frame.render_widget(paragraph, area);
}
