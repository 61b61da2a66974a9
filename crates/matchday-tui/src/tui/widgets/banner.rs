// Banner widget: the latest notification while it is fresh, otherwise a
// one-line summary of the session.

use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use matchday_app::protocol::{AppSnapshot, Notification, NotificationLevel};

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, now: Instant) {
    if let Some(notification) = state.visible_notification(now) {
        render_notification(frame, area, notification);
        return;
    }

    let line = match &state.snapshot {
        Some(snapshot) => Line::from(summary_spans(snapshot)),
        None => Line::from(Span::styled(
            "Loading league data...",
            Style::default().fg(Color::DarkGray),
        )),
    };
    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Matchday"));
    frame.render_widget(paragraph, area);
}

fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let color = level_color(notification.level);
    let paragraph = Paragraph::new(Line::from(Span::styled(
        notification.message.clone(),
        Style::default().fg(color),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(Span::styled(
                format!(" {} ", notification.title),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(paragraph, area);
}

pub fn level_color(level: NotificationLevel) -> Color {
    match level {
        NotificationLevel::Success => Color::Green,
        NotificationLevel::Info => Color::Cyan,
        NotificationLevel::Warning => Color::Yellow,
        NotificationLevel::Error => Color::Red,
    }
}

fn summary_spans(snapshot: &AppSnapshot) -> Vec<Span<'static>> {
    let drafting = snapshot
        .current()
        .map(|s| s.participant.name.clone())
        .unwrap_or_default();
    let total: i64 = snapshot.participants.iter().map(|s| s.participant.score).sum();
    let live = snapshot.matches.iter().filter(|m| m.status.is_live()).count();

    let season = if snapshot.season_started {
        format!("Season {} in progress", snapshot.season_name)
    } else {
        format!(
            "Season {} starts in {} days",
            snapshot.season_name, snapshot.days_until_start
        )
    };

    vec![
        Span::styled(season, Style::default().fg(Color::White)),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{} points in play", total),
            Style::default().fg(Color::White),
        ),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{} live", live),
            Style::default().fg(if live > 0 { Color::Red } else { Color::Gray }),
        ),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled("Drafting: ", Style::default().fg(Color::Gray)),
        Span::styled(
            drafting,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]
}
