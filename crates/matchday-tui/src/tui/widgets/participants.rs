// Participants widget: every participant's clubs, team value, how the
// current finished results score for them, and their badges.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use matchday_app::protocol::{ParticipantSummary, TabId};
use matchday_core::participant::MAX_ROSTER;
use matchday_core::scoring::ScoreLine;

use super::{format_points, format_value, render_placeholder};
use crate::tui::input::scroll_key;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        render_placeholder(frame, area, "Participants", "Waiting for game state...");
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    for (i, summary) in snapshot.participants.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.extend(participant_lines(summary, i == snapshot.current_participant));
    }

    let offset = state.scroll(scroll_key(TabId::Participants));
    let max_offset = lines.len().saturating_sub(1);
    let paragraph = Paragraph::new(lines)
        .scroll((offset.min(max_offset) as u16, 0))
        .block(Block::default().borders(Borders::ALL).title("Participants"));
    frame.render_widget(paragraph, area);
}

/// Header, club list, score breakdown and badges for one participant.
pub fn participant_lines(summary: &ParticipantSummary, drafting: bool) -> Vec<Line<'static>> {
    let p = &summary.participant;
    let mut name_style = Style::default().add_modifier(Modifier::BOLD);
    if drafting {
        name_style = name_style.fg(Color::Yellow);
    }

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("[{}] {}", p.avatar, p.name), name_style),
        Span::styled(
            format!(
                "  {} pts  ({} last week)  {}/{} clubs  {}",
                p.score,
                format_points(p.weekly_points),
                p.teams.len(),
                MAX_ROSTER,
                format_value(summary.team_value)
            ),
            Style::default().fg(Color::Gray),
        ),
    ])];

    let clubs = if p.teams.is_empty() {
        "no clubs drafted".to_string()
    } else {
        p.teams.join(", ")
    };
    lines.push(Line::from(Span::raw(format!("  Clubs: {clubs}"))));

    for line in &summary.breakdown {
        lines.push(breakdown_line(line));
    }

    if !p.achievements.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  Badges: {}", p.achievements.join(", ")),
            Style::default().fg(Color::Magenta),
        )));
    }
    lines
}

/// "    Burnley 1-0 Liverpool  W +3 / underdog +5 = +8"
pub fn breakdown_line(line: &ScoreLine) -> Line<'static> {
    let total = line.total();
    let color = if total > 0 {
        Color::Green
    } else if total < 0 {
        Color::Red
    } else {
        Color::Gray
    };

    let mut detail = format!(
        "{} {}-{} {}  ",
        line.club, line.goals_for, line.goals_against, line.opponent
    );
    if line.won() {
        detail.push_str(&format!("W {}", format_points(line.win_points)));
    } else {
        detail.push_str("no win");
    }
    if line.conceded_penalty != 0 {
        detail.push_str(&format!(" / conceded {}", line.conceded_penalty));
    }
    if line.underdog_bonus != 0 {
        detail.push_str(&format!(" / underdog {}", format_points(line.underdog_bonus)));
    }

    Line::from(vec![
        Span::raw(format!("    {detail} = ")),
        Span::styled(format_points(total), Style::default().fg(color)),
    ])
}
