// Messages between the application loop and the terminal UI.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use matchday_core::club::Club;
use matchday_core::fixture::MatchResult;
use matchday_core::participant::Participant;
use matchday_core::scoring::ScoreLine;

pub use crate::feed::DataSource;
use crate::feed::types::{Scorer, StandingRow};

// ---------------------------------------------------------------------------
// TUI -> app
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Switch the drafting participant by index.
    SelectParticipant(usize),
    /// Draft or release a club for the current participant.
    ToggleClub(String),
    ClearRoster,
    SaveSelection,
    CalculatePoints,
    SimulateWeek,
    ForceRefresh,
    SetAutoRefresh(bool),
    /// Export to the given path, or the default file name in the working
    /// directory.
    Export(Option<PathBuf>),
    Import(PathBuf),
    Quit,
}

// ---------------------------------------------------------------------------
// app -> TUI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum UiUpdate {
    StateSnapshot(Box<AppSnapshot>),
    Notification(Notification),
    ConnectionStatus(ConnectionStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    /// No API key: running on placeholder data by choice.
    Offline,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: &str, message: impl Into<String>) -> Self {
        Notification {
            level,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, "Success", message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, "Info", message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, "Error", message)
    }
}

/// One participant with derived figures for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub participant: Participant,
    pub team_value: u32,
    /// How the current finished matches would score for this participant.
    pub breakdown: Vec<ScoreLine>,
}

/// Everything the UI needs to draw one frame of game state.
#[derive(Debug, Clone)]
pub struct AppSnapshot {
    pub participants: Vec<ParticipantSummary>,
    pub current_participant: usize,
    pub current_week: u32,
    pub season_name: String,
    pub season_started: bool,
    pub days_until_start: i64,
    pub clubs: Vec<Club>,
    pub matches: Vec<MatchResult>,
    pub standings: Vec<StandingRow>,
    pub scorers: Vec<Scorer>,
    pub data_source: DataSource,
    pub auto_refresh: bool,
    pub last_update: Option<DateTime<Utc>>,
}

impl AppSnapshot {
    /// Name of the participant that owns `club`, if any.
    pub fn owner_of(&self, club: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .map(|s| &s.participant)
            .find(|p| p.owns(club))
    }

    pub fn current(&self) -> Option<&ParticipantSummary> {
        self.participants.get(self.current_participant)
    }
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabId {
    Leaderboard,
    Participants,
    Draft,
    Live,
    Upcoming,
    Standings,
    Scorers,
}

impl TabId {
    pub const ALL: [TabId; 7] = [
        TabId::Leaderboard,
        TabId::Participants,
        TabId::Draft,
        TabId::Live,
        TabId::Upcoming,
        TabId::Standings,
        TabId::Scorers,
    ];

    pub fn title(self) -> &'static str {
        match self {
            TabId::Leaderboard => "Leaderboard",
            TabId::Participants => "Participants",
            TabId::Draft => "Draft",
            TabId::Live => "Live",
            TabId::Upcoming => "Upcoming",
            TabId::Standings => "Standings",
            TabId::Scorers => "Scorers",
        }
    }

    pub fn index(self) -> usize {
        TabId::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Tab for a 1-based number key.
    pub fn from_number(n: u32) -> Option<TabId> {
        let idx = (n as usize).checked_sub(1)?;
        TabId::ALL.get(idx).copied()
    }
}
