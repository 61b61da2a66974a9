// Scorers widget: the top-scorer chart.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use matchday_app::protocol::TabId;

use super::matches::club_label;
use super::render_placeholder;
use crate::tui::input::scroll_key;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        render_placeholder(frame, area, "Scorers", "Waiting for scorer chart...");
        return;
    };
    if snapshot.scorers.is_empty() {
        render_placeholder(frame, area, "Scorers", "No scorer data available");
        return;
    }

    let header = Row::new(vec!["#", "Player", "Club", "Goals", "Ast"]).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let skip = state.scroll(scroll_key(TabId::Scorers));
    let rows: Vec<Row> = snapshot
        .scorers
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, scorer)| {
            Row::new(vec![
                Cell::from((i + 1).to_string()),
                Cell::from(scorer.name.clone()),
                Cell::from(club_label(snapshot, &scorer.club)),
                Cell::from(scorer.goals.to_string())
                    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Cell::from(scorer.assists.map_or("-".to_string(), |a| a.to_string())),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(5),
        Constraint::Length(4),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Scorers"));
    frame.render_widget(table, area);
}
