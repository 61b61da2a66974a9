// Roster widget: the drafting participant's five slots.
//
// "1. Manchester City  €1000m" or "4. [empty]", followed by the team value.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem};
use ratatui::Frame;

use matchday_app::protocol::AppSnapshot;
use matchday_core::participant::MAX_ROSTER;

use super::{format_value, render_placeholder};
use crate::tui::ViewState;

/// One line per roster slot, filled slots first.
pub fn slot_lines(snapshot: &AppSnapshot) -> Vec<String> {
    let Some(current) = snapshot.current() else {
        return Vec::new();
    };
    (0..MAX_ROSTER)
        .map(|i| match current.participant.teams.get(i) {
            Some(club) => {
                let value = snapshot
                    .clubs
                    .iter()
                    .find(|c| &c.name == club)
                    .map(|c| format_value(c.value))
                    .unwrap_or_else(|| "--".to_string());
                format!("{}. {}  {}", i + 1, club, value)
            }
            None => format!("{}. [empty]", i + 1),
        })
        .collect()
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        render_placeholder(frame, area, "Roster", "No roster data.");
        return;
    };
    let Some(current) = snapshot.current() else {
        render_placeholder(frame, area, "Roster", "No participants.");
        return;
    };

    let mut items: Vec<ListItem> = slot_lines(snapshot)
        .into_iter()
        .map(|line| {
            let style = if line.ends_with("[empty]") {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(format!(" {line}"), style)))
        })
        .collect();
    items.push(ListItem::new(Line::from(Span::styled(
        format!(" Team value {}", format_value(current.team_value)),
        Style::default().add_modifier(Modifier::BOLD),
    ))));

    let p = &current.participant;
    let title = format!("{} · {}/{}", p.name, p.teams.len(), MAX_ROSTER);
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}
