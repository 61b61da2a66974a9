// Participants: the four fixed players of the game and their rosters.

use serde::{Deserialize, Serialize};

/// Maximum number of clubs a participant may own.
pub const MAX_ROSTER: usize = 5;

/// Awarded when an owned club beats an opponent worth at least twice as much.
pub const UNDERDOG_VICTORY: &str = "Underdog Victory";

/// Shown in the demo draft for the participant backing all three promoted clubs.
pub const PROMOTED_TEAM_SUPPORT: &str = "Promoted Team Support";

/// Bonus badges handed out at random by a simulated gameweek.
pub const BONUS_ACHIEVEMENTS: [&str; 4] = ["Top 4", "League Champion", "Golden Boot", "Top Assister"];

/// A person playing the game.
///
/// Field names serialize in camelCase so the persisted form matches the
/// exported JSON files (`weeklyPoints`, `teams`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Stable identifier (1-based).
    pub id: u32,
    pub name: String,
    /// Short avatar label (initials).
    pub avatar: String,
    /// Cumulative score: the sum of every applied weekly delta.
    #[serde(default)]
    pub score: i64,
    /// Owned club names in draft order.
    #[serde(default)]
    pub teams: Vec<String>,
    /// Delta from the most recent scoring pass.
    #[serde(default)]
    pub weekly_points: i64,
    /// Earned badge labels, each present at most once.
    #[serde(default)]
    pub achievements: Vec<String>,
}

impl Participant {
    pub fn new(id: u32, name: &str, avatar: &str) -> Self {
        Participant {
            id,
            name: name.to_string(),
            avatar: avatar.to_string(),
            score: 0,
            teams: Vec::new(),
            weekly_points: 0,
            achievements: Vec::new(),
        }
    }

    pub fn owns(&self, club: &str) -> bool {
        self.teams.iter().any(|t| t == club)
    }

    pub fn roster_full(&self) -> bool {
        self.teams.len() >= MAX_ROSTER
    }

    pub fn has_achievement(&self, label: &str) -> bool {
        self.achievements.iter().any(|a| a == label)
    }

    /// Add an achievement label. Returns `false` if it was already held.
    pub fn award(&mut self, label: &str) -> bool {
        if self.has_achievement(label) {
            return false;
        }
        self.achievements.push(label.to_string());
        true
    }
}

/// The four participants every session starts with.
pub fn default_participants() -> Vec<Participant> {
    vec![
        Participant::new(1, "Ashley", "A"),
        Participant::new(2, "Aaron", "AA"),
        Participant::new(3, "Steve", "S"),
        Participant::new(4, "Phil", "P"),
    ]
}
