// Match results as consumed by the scoring engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a fixture. Only `Finished` matches count towards scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    Scheduled,
    InPlay,
    Paused,
    Finished,
    Postponed,
}

impl MatchStatus {
    /// Whether the match is currently being played (including half time).
    pub fn is_live(self) -> bool {
        matches!(self, MatchStatus::InPlay | MatchStatus::Paused)
    }
}

/// Full-time (or running) score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

/// One fixture between two clubs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Feed identifier, used to merge fixture lists without duplicates.
    pub id: u64,
    pub home: String,
    pub away: String,
    /// `None` until the match kicks off.
    pub score: Option<Score>,
    pub status: MatchStatus,
    /// Minute of play for live matches.
    pub minute: Option<u8>,
    pub kickoff: DateTime<Utc>,
}

/// One club's view of a finished result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideResult<'a> {
    pub opponent: &'a str,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl MatchResult {
    pub fn involves(&self, club: &str) -> bool {
        self.home == club || self.away == club
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// Resolve goals from `club`'s side. Returns `None` when the club did not
    /// play in this match or no score is known.
    pub fn side(&self, club: &str) -> Option<SideResult<'_>> {
        let score = self.score?;
        if self.home == club {
            Some(SideResult {
                opponent: &self.away,
                goals_for: score.home,
                goals_against: score.away,
            })
        } else if self.away == club {
            Some(SideResult {
                opponent: &self.home,
                goals_for: score.away,
                goals_against: score.home,
            })
        } else {
            None
        }
    }
}
