// Standings widget: the Premier League table, with drafted clubs tagged by
// their owner's avatar.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use matchday_app::protocol::TabId;

use super::render_placeholder;
use super::matches::club_label;
use crate::tui::input::scroll_key;
use crate::tui::ViewState;

/// Positions that qualify for the Champions League, and the drop zone.
const TOP_FOUR: u32 = 4;
const RELEGATION_FROM: u32 = 18;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        render_placeholder(frame, area, "Standings", "Waiting for league table...");
        return;
    };
    if snapshot.standings.is_empty() {
        render_placeholder(frame, area, "Standings", "No table available");
        return;
    }

    let header = Row::new(vec!["Pos", "Club", "P", "W", "D", "L", "GD", "Pts"]).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let skip = state.scroll(scroll_key(TabId::Standings));
    let rows: Vec<Row> = snapshot
        .standings
        .iter()
        .skip(skip)
        .map(|row| {
            let style = if row.position <= TOP_FOUR {
                Style::default().fg(Color::Green)
            } else if row.position >= RELEGATION_FROM {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(row.position.to_string()),
                Cell::from(club_label(snapshot, &row.club)),
                Cell::from(row.played.to_string()),
                Cell::from(row.won.to_string()),
                Cell::from(row.draw.to_string()),
                Cell::from(row.lost.to_string()),
                Cell::from(format!("{:+}", row.goal_difference())),
                Cell::from(row.points.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Length(4),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Standings"));
    frame.render_widget(table, area);
}
