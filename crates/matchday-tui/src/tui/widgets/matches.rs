// Match widgets: live and finished results, and upcoming fixtures.
//
// Clubs owned by a participant carry the owner's avatar so results can be
// read against the draft at a glance.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use matchday_app::protocol::{AppSnapshot, TabId};
use matchday_core::fixture::{MatchResult, MatchStatus};

use super::render_placeholder;
use crate::tui::input::scroll_key;
use crate::tui::ViewState;

/// Matches in play (or at half time) first, then finished results.
pub fn live_matches(matches: &[MatchResult]) -> Vec<&MatchResult> {
    let mut live: Vec<&MatchResult> = matches
        .iter()
        .filter(|m| m.status.is_live() || m.is_finished())
        .collect();
    live.sort_by_key(|m| (m.is_finished(), m.kickoff));
    live
}

/// Scheduled and postponed fixtures by kick-off time.
pub fn upcoming_matches(matches: &[MatchResult]) -> Vec<&MatchResult> {
    let mut upcoming: Vec<&MatchResult> = matches
        .iter()
        .filter(|m| matches!(m.status, MatchStatus::Scheduled | MatchStatus::Postponed))
        .collect();
    upcoming.sort_by_key(|m| m.kickoff);
    upcoming
}

/// Club name with the owner's avatar, e.g. "Burnley [P]".
pub fn club_label(snapshot: &AppSnapshot, club: &str) -> String {
    match snapshot.owner_of(club) {
        Some(owner) => format!("{} [{}]", club, owner.avatar),
        None => club.to_string(),
    }
}

pub fn status_label(m: &MatchResult) -> String {
    match m.status {
        MatchStatus::InPlay => m.minute.map_or("LIVE".to_string(), |min| format!("{min}'")),
        MatchStatus::Paused => "HT".to_string(),
        MatchStatus::Finished => "FT".to_string(),
        MatchStatus::Scheduled => m.kickoff.format("%a %d %b %H:%M").to_string(),
        MatchStatus::Postponed => "PST".to_string(),
    }
}

fn score_label(m: &MatchResult) -> String {
    match m.score {
        Some(s) => format!("{} - {}", s.home, s.away),
        None => "v".to_string(),
    }
}

fn match_rows<'a>(snapshot: &AppSnapshot, matches: &[&MatchResult], skip: usize) -> Vec<Row<'a>> {
    matches
        .iter()
        .skip(skip)
        .map(|m| {
            let style = match m.status {
                MatchStatus::InPlay | MatchStatus::Paused => Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
                MatchStatus::Postponed => Style::default().fg(Color::DarkGray),
                _ => Style::default(),
            };
            Row::new(vec![
                Cell::from(status_label(m)),
                Cell::from(club_label(snapshot, &m.home)),
                Cell::from(score_label(m)),
                Cell::from(club_label(snapshot, &m.away)),
            ])
            .style(style)
        })
        .collect()
}

fn render_table(frame: &mut Frame, area: Rect, rows: Vec<Row>, title: String, first_col: u16) {
    let widths = [
        Constraint::Length(first_col),
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Fill(1),
    ];
    let table = Table::new(rows, widths).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

pub fn render_live(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        render_placeholder(frame, area, "Live", "Waiting for match data...");
        return;
    };
    let matches = live_matches(&snapshot.matches);
    if matches.is_empty() {
        let message = if snapshot.season_started {
            "No matches in play right now"
        } else {
            "The season has not started yet"
        };
        render_placeholder(frame, area, "Live", message);
        return;
    }

    let in_play = matches.iter().filter(|m| m.status.is_live()).count();
    let title = format!("Live · {} in play, {} finished", in_play, matches.len() - in_play);
    let skip = state.scroll(scroll_key(TabId::Live));
    let rows = match_rows(snapshot, &matches, skip);
    render_table(frame, area, rows, title, 6);
}

pub fn render_upcoming(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        render_placeholder(frame, area, "Upcoming", "Waiting for match data...");
        return;
    };
    let matches = upcoming_matches(&snapshot.matches);
    if matches.is_empty() {
        render_placeholder(frame, area, "Upcoming", "No fixtures scheduled");
        return;
    }

    let title = format!("Upcoming · {} fixtures", matches.len());
    let skip = state.scroll(scroll_key(TabId::Upcoming));
    let rows = match_rows(snapshot, &matches, skip);
    render_table(frame, area, rows, title, 17);
}
