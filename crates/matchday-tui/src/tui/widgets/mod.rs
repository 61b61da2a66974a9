// TUI widget modules for each dashboard panel.

pub mod banner;
pub mod dialog;
pub mod draft;
pub mod leaderboard;
pub mod matches;
pub mod participants;
pub mod roster;
pub mod scorers;
pub mod standings;
pub mod status_bar;

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Bordered panel with a single dimmed line, for empty or loading states.
pub(crate) fn render_placeholder(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(format!("  {message}"))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(paragraph, area);
}

/// Signed points with an explicit plus for gains.
pub fn format_points(points: i64) -> String {
    if points > 0 {
        format!("+{points}")
    } else {
        points.to_string()
    }
}

/// Market value in millions, e.g. "€950m".
pub fn format_value(value: u32) -> String {
    format!("€{value}m")
}
