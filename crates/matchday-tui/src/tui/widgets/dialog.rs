// Modal overlays: quit confirmation and the import path prompt.
//
// Drawn last, centered over the dashboard, with the area behind cleared.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

const QUIT_SIZE: (u16, u16) = (28, 5);
const IMPORT_SIZE: (u16, u16) = (60, 5);

fn key_span(key: &'static str, color: Color) -> Span<'static> {
    Span::styled(key, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn dialog_block(title: &'static str, color: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
}

pub fn render_quit_confirm(frame: &mut Frame, area: Rect) {
    let dialog = centered_rect(QUIT_SIZE.0, QUIT_SIZE.1, area);
    frame.render_widget(Clear, dialog);

    let text = Line::from(vec![
        Span::raw("  Really quit? ("),
        key_span("y", Color::Green),
        Span::raw("/"),
        key_span("n", Color::Red),
        Span::raw(")"),
    ]);
    let paragraph = Paragraph::new(text)
        .block(dialog_block(" Quit? ", Color::Yellow))
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog);
}

/// Text input for the file to import, with a trailing cursor.
pub fn render_import_prompt(frame: &mut Frame, area: Rect, path: &str) {
    let dialog = centered_rect(IMPORT_SIZE.0, IMPORT_SIZE.1, area);
    frame.render_widget(Clear, dialog);

    let lines = vec![
        Line::from(vec![
            Span::raw(" Path: "),
            Span::styled(path.to_string(), Style::default().fg(Color::White)),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(vec![
            Span::raw(" "),
            key_span("Enter", Color::Green),
            Span::raw(" import   "),
            key_span("Esc", Color::Red),
            Span::raw(" cancel"),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .block(dialog_block(" Import session ", Color::Cyan))
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog);
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}
