// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Banner (3 rows): notification or season summary   |
// +-------------------------+------------------------+
// | Main Panel (68%)         | Sidebar (32%)          |
// |                          | +- Roster (55%) ------+|
// |                          | +- Leaders (45%) -----+|
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Connection, gameweek, data source and tab bar.
    pub status_bar: Rect,
    pub banner: Rect,
    /// Tab-switched content area.
    pub main_panel: Rect,
    /// Drafting participant's clubs.
    pub roster: Rect,
    /// Compact standings of the participants.
    pub leaders: Rect,
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(3), // banner
            Constraint::Min(8),    // main + sidebar
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(vertical[2]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(horizontal[1]);

    AppLayout {
        status_bar: vertical[0],
        banner: vertical[1],
        main_panel: horizontal[0],
        roster: sidebar[0],
        leaders: sidebar[1],
        help_bar: vertical[3],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
