// Status bar widget: connection, gameweek, data source, last update, tabs.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use matchday_app::protocol::{AppSnapshot, ConnectionStatus, DataSource, TabId};

use crate::tui::ViewState;

/// Layout: [connection] [gameweek] | [source] [updated] [auto] | [tab bar]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    let (dot, dot_color) = connection_indicator(state.connection_status);
    spans.push(Span::styled(format!(" {} ", dot), Style::default().fg(dot_color)));

    match &state.snapshot {
        Some(snapshot) => {
            spans.push(Span::styled(
                week_label(snapshot),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
            spans.push(Span::styled(
                snapshot.data_source.to_string(),
                Style::default().fg(source_color(snapshot.data_source)),
            ));
            if let Some(updated) = snapshot.last_update {
                spans.push(Span::styled(
                    format!(" @ {}", updated.format("%H:%M:%S")),
                    Style::default().fg(Color::Gray),
                ));
            }
            if snapshot.auto_refresh {
                spans.push(Span::styled(" [auto]", Style::default().fg(Color::Cyan)));
            }
        }
        None => spans.push(Span::styled("Loading...", Style::default().fg(Color::Gray))),
    }

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.extend(tab_spans(state.active_tab));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

pub fn connection_indicator(status: ConnectionStatus) -> (&'static str, Color) {
    match status {
        ConnectionStatus::Connected => ("●", Color::Green),
        ConnectionStatus::Connecting => ("●", Color::Yellow),
        ConnectionStatus::Offline => ("○", Color::Gray),
        ConnectionStatus::Error => ("●", Color::Red),
    }
}

/// "GW 8 · 2025-26", or the countdown before kick-off.
pub fn week_label(snapshot: &AppSnapshot) -> String {
    if snapshot.season_started {
        format!("GW {} · {}", snapshot.current_week, snapshot.season_name)
    } else {
        format!(
            "Pre-season · {} days to go",
            snapshot.days_until_start
        )
    }
}

fn source_color(source: DataSource) -> Color {
    match source {
        DataSource::Live => Color::Green,
        DataSource::Mixed => Color::Yellow,
        DataSource::Placeholder => Color::Magenta,
    }
}

/// "[1:Leaderboard] [2:Participants] ..." with the active tab highlighted.
pub fn tab_spans(active: TabId) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, tab) in TabId::ALL.iter().enumerate() {
        let style = if *tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}:{}]", i + 1, tab.title()), style));
        spans.push(Span::raw(" "));
    }
    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
