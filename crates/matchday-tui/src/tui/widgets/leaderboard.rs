// Leaderboard widget: participants ranked by cumulative score.
//
// The full table lives on the Leaderboard tab; a compact version sits in the
// sidebar under the roster.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use matchday_app::protocol::{AppSnapshot, ParticipantSummary};

use super::{format_points, format_value, render_placeholder};
use crate::tui::ViewState;

/// Participants by score, highest first. Ties go to the lower id.
pub fn ranked(snapshot: &AppSnapshot) -> Vec<&ParticipantSummary> {
    let mut sorted: Vec<&ParticipantSummary> = snapshot.participants.iter().collect();
    sorted.sort_by(|a, b| {
        b.participant
            .score
            .cmp(&a.participant.score)
            .then(a.participant.id.cmp(&b.participant.id))
    });
    sorted
}

fn rank_style(rank: usize) -> Style {
    match rank {
        1 => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        2 => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::White),
    }
}

fn weekly_style(points: i64) -> Style {
    match points {
        p if p > 0 => Style::default().fg(Color::Green),
        p if p < 0 => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Gray),
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        render_placeholder(frame, area, "Leaderboard", "Waiting for game state...");
        return;
    };

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Participant"),
        Cell::from("Score"),
        Cell::from("Last week"),
        Cell::from("Team value"),
        Cell::from("Badges"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = ranked(snapshot)
        .into_iter()
        .enumerate()
        .map(|(i, summary)| {
            let p = &summary.participant;
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(format!("[{}] {}", p.avatar, p.name)),
                Cell::from(p.score.to_string()),
                Cell::from(format_points(p.weekly_points)).style(weekly_style(p.weekly_points)),
                Cell::from(format_value(summary.team_value)),
                Cell::from(p.achievements.join(", ")),
            ])
            .style(rank_style(i + 1))
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(16),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Fill(1),
    ];

    let title = format!("Leaderboard · GW {}", snapshot.current_week);
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

/// Rank, name and score only.
pub fn render_compact(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        render_placeholder(frame, area, "Table", "--");
        return;
    };

    let rows: Vec<Row> = ranked(snapshot)
        .into_iter()
        .enumerate()
        .map(|(i, summary)| {
            let p = &summary.participant;
            Row::new(vec![
                Cell::from(format!("{}.", i + 1)),
                Cell::from(p.name.clone()),
                Cell::from(p.score.to_string()),
                Cell::from(format_points(p.weekly_points)).style(weekly_style(p.weekly_points)),
            ])
            .style(rank_style(i + 1))
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(5),
        Constraint::Length(5),
    ];
    let table = Table::new(rows, widths).block(Block::default().borders(Borders::ALL).title("Table"));
    frame.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
