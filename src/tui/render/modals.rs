use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, AutomationField};

use super::helpers::{centered_rect_fixed, fit};

fn popup_block(app: &App, title: &str) -> Block<'static> {
    let bg = app.theme.background;
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(bg))
}

fn draw_popup(frame: &mut Frame, app: &App, area: Rect, title: &str, width: u16, lines: Vec<Line>) {
    let popup_w = width.min(area.width.saturating_sub(2));
    let popup_h = ((lines.len() as u16) + 2).min(area.height.saturating_sub(2));
    let popup = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(lines)
        .block(popup_block(app, title))
        .style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, popup);
}

/// Checkbox list of the collection's lists
pub fn render_add_to_list(frame: &mut Frame, app: &App, area: Rect) {
    let Some(modal) = &app.add_to_list else {
        return;
    };
    let bg = app.theme.background;
    let text = Style::default().fg(app.theme.text).bg(bg);
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let inner_w = 44usize;

    let selected = modal.pages.len();
    let plural = if selected == 1 { "" } else { "s" };
    let mut lines = vec![
        Line::from(Span::styled(format!(" Add {} page{} to:", selected, plural), text)),
        Line::from(""),
    ];

    if modal.checked.is_empty() {
        lines.push(Line::from(Span::styled(" This collection has no lists", dim)));
    }
    for (i, (list_id, on)) in modal.checked.iter().enumerate() {
        let title = app
            .controller
            .collection()
            .find_list(list_id)
            .map_or(list_id.as_str(), |l| l.title.as_str());
        let is_cursor = i == modal.cursor;
        let row_bg = if is_cursor { app.theme.selection_bg } else { bg };
        let check = if *on { "[x]" } else { "[ ]" };
        let check_fg = if *on { app.theme.selected } else { app.theme.dim };
        lines.push(Line::from(vec![
            Span::styled(" ", Style::default().bg(row_bg)),
            Span::styled(check, Style::default().fg(check_fg).bg(row_bg)),
            Span::styled(
                format!(" {}", fit(title, inner_w - 5)),
                Style::default().fg(app.theme.text_bright).bg(row_bg),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " space toggle  Enter add  Esc cancel",
        dim,
    )));

    draw_popup(frame, app, area, "Add to list", inner_w as u16 + 2, lines);
}

/// Form for queueing an automation over pasted links
pub fn render_automation(frame: &mut Frame, app: &App, area: Rect) {
    let Some(modal) = &app.automation else {
        return;
    };
    let bg = app.theme.background;
    let text = Style::default().fg(app.theme.text).bg(bg);
    let bright = Style::default().fg(app.theme.text_bright).bg(bg);
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let cursor = Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg));
    let inner_w = 56usize;

    let mut lines: Vec<Line> = Vec::new();
    if modal.created {
        lines.push(Line::from(Span::styled(
            " Created!",
            Style::default()
                .fg(app.theme.green)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!(" Automation queued for list \"{}\"", modal.name.trim()),
            text,
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Esc close", dim)));
        draw_popup(frame, app, area, "New automation", inner_w as u16 + 2, lines);
        return;
    }

    let label = |field: AutomationField, name: &'static str| {
        let style = if modal.field == field {
            Style::default().fg(app.theme.highlight).bg(bg)
        } else {
            dim
        };
        Line::from(Span::styled(name, style))
    };

    lines.push(label(AutomationField::Name, " List name"));
    let mut name = vec![Span::styled(format!("   {}", modal.name), bright)];
    if modal.field == AutomationField::Name {
        name.push(cursor.clone());
    }
    lines.push(Line::from(name));
    lines.push(Line::from(""));

    lines.push(label(AutomationField::Links, " Links (one per line)"));
    let link_lines: Vec<&str> = modal.links.split('\n').collect();
    let last = link_lines.len() - 1;
    for (i, link) in link_lines.iter().enumerate() {
        let mut spans = vec![Span::styled(format!("   {}", fit(link, inner_w - 4).trim_end()), bright)];
        if modal.field == AutomationField::Links && i == last {
            spans.push(cursor.clone());
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Tab switch field  Ctrl-S create  Esc cancel",
        dim,
    )));

    draw_popup(frame, app, area, "New automation", inner_w as u16 + 2, lines);
}
