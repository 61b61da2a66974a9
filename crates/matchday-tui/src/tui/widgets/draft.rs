// Draft widget: the club catalog with ownership state for the drafting
// participant.
//
// Columns: Club, Value, Exp. position, Status. Clubs owned by the drafting
// participant are green; clubs owned by someone else are dimmed and marked
// "taken". The cursor row is highlighted.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use matchday_app::protocol::AppSnapshot;
use matchday_core::club::Club;
use matchday_core::participant::MAX_ROSTER;

use super::{format_value, render_placeholder};
use crate::tui::ViewState;

/// Ownership of a club from the drafting participant's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClubStatus {
    Available,
    Mine,
    Taken(String),
}

pub fn club_status(snapshot: &AppSnapshot, club: &Club) -> ClubStatus {
    let me = snapshot.current().map(|s| s.participant.id);
    match snapshot.owner_of(&club.name) {
        None => ClubStatus::Available,
        Some(owner) if Some(owner.id) == me => ClubStatus::Mine,
        Some(owner) => ClubStatus::Taken(owner.name.clone()),
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        render_placeholder(frame, area, "Draft", "Waiting for game state...");
        return;
    };

    let header = Row::new(vec![
        Cell::from("Club"),
        Cell::from("Value"),
        Cell::from("Exp."),
        Cell::from("Status"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = snapshot
        .clubs
        .iter()
        .map(|club| {
            let name = if club.promoted {
                format!("{} (P)", club.name)
            } else {
                club.name.clone()
            };
            let (status, style) = match club_status(snapshot, club) {
                ClubStatus::Available => ("free".to_string(), Style::default()),
                ClubStatus::Mine => (
                    "✓ selected".to_string(),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                ClubStatus::Taken(owner) => (
                    format!("taken by {owner}"),
                    Style::default().fg(Color::DarkGray),
                ),
            };
            Row::new(vec![
                Cell::from(name),
                Cell::from(format_value(club.value)),
                Cell::from(format!("#{}", club.expected_position)),
                Cell::from(status),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(8),
        Constraint::Length(5),
        Constraint::Length(18),
    ];

    let title = match snapshot.current() {
        Some(current) => format!(
            "Draft · {} ({}/{})",
            current.participant.name,
            current.participant.teams.len(),
            MAX_ROSTER
        ),
        None => "Draft".to_string(),
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut table_state = TableState::default().with_selected(Some(state.selected_club));
    frame.render_stateful_widget(table, area, &mut table_state);
}
