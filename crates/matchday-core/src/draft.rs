// Draft state: participants, roster assignment, and the exclusivity rule.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::club::ClubCatalog;
use crate::participant::{default_participants, Participant, MAX_ROSTER};

/// Rejected draft actions. Every variant leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{club} has already been picked by {owner}")]
    DraftConflict { club: String, owner: String },

    #[error("{participant} already has {max} clubs; remove one first")]
    RosterFull { participant: String, max: usize },

    #[error("{participant} must select exactly {need} clubs, currently has {have}")]
    IncompleteRoster {
        participant: String,
        have: usize,
        need: usize,
    },

    #[error("unknown club: {0}")]
    UnknownClub(String),

    #[error("unknown participant id: {0}")]
    UnknownParticipant(u32),
}

/// What a successful `assign_club` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOutcome {
    Added,
    Removed,
}

/// The complete game state for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Participants in id order.
    pub participants: Vec<Participant>,
    /// Index into `participants` of the one currently drafting.
    pub current_participant: usize,
    /// Gameweek number (0 = pre-season).
    pub current_week: u32,
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(default_participants(), 0)
    }
}

impl GameState {
    pub fn new(participants: Vec<Participant>, current_week: u32) -> Self {
        GameState {
            participants,
            current_participant: 0,
            current_week,
        }
    }

    pub fn participant(&self, id: u32) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: u32) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// The participant currently drafting. Falls back to the first
    /// participant if the stored index is out of range.
    pub fn current(&self) -> Option<&Participant> {
        self.participants
            .get(self.current_participant)
            .or_else(|| self.participants.first())
    }

    /// Switch the drafting participant. Out-of-range indexes are ignored.
    pub fn select_participant(&mut self, index: usize) -> bool {
        if index < self.participants.len() {
            self.current_participant = index;
            true
        } else {
            false
        }
    }

    /// The participant that owns `club`, if any.
    pub fn owner_of(&self, club: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.owns(club))
    }

    /// Draft or un-draft a club for a participant.
    ///
    /// Checks, in order: the club and participant exist; no other participant
    /// owns the club; if the participant already owns it the club is removed
    /// (toggle); otherwise the roster must have room.
    pub fn assign_club(
        &mut self,
        participant_id: u32,
        club: &str,
        catalog: &ClubCatalog,
    ) -> Result<DraftOutcome, DraftError> {
        if !catalog.contains(club) {
            return Err(DraftError::UnknownClub(club.to_string()));
        }
        if self.participant(participant_id).is_none() {
            return Err(DraftError::UnknownParticipant(participant_id));
        }

        if let Some(owner) = self
            .participants
            .iter()
            .find(|p| p.id != participant_id && p.owns(club))
        {
            debug!("{} rejected: owned by {}", club, owner.name);
            return Err(DraftError::DraftConflict {
                club: club.to_string(),
                owner: owner.name.clone(),
            });
        }

        let participant = self
            .participant_mut(participant_id)
            .ok_or(DraftError::UnknownParticipant(participant_id))?;

        if let Some(idx) = participant.teams.iter().position(|t| t == club) {
            participant.teams.remove(idx);
            info!("{} released {}", participant.name, club);
            return Ok(DraftOutcome::Removed);
        }

        if participant.roster_full() {
            return Err(DraftError::RosterFull {
                participant: participant.name.clone(),
                max: MAX_ROSTER,
            });
        }

        participant.teams.push(club.to_string());
        info!(
            "{} drafted {} ({}/{})",
            participant.name,
            club,
            participant.teams.len(),
            MAX_ROSTER
        );
        Ok(DraftOutcome::Added)
    }

    /// Empty a participant's roster.
    pub fn clear_roster(&mut self, participant_id: u32) -> Result<(), DraftError> {
        let participant = self
            .participant_mut(participant_id)
            .ok_or(DraftError::UnknownParticipant(participant_id))?;
        participant.teams.clear();
        info!("Cleared roster for {}", participant.name);
        Ok(())
    }

    /// Confirm a participant's selection. Requires a full roster.
    pub fn finalize_selection(&self, participant_id: u32) -> Result<(), DraftError> {
        let participant = self
            .participant(participant_id)
            .ok_or(DraftError::UnknownParticipant(participant_id))?;
        if participant.teams.len() < MAX_ROSTER {
            return Err(DraftError::IncompleteRoster {
                participant: participant.name.clone(),
                have: participant.teams.len(),
                need: MAX_ROSTER,
            });
        }
        Ok(())
    }

    /// Participants sorted by cumulative score, highest first. Ties keep id
    /// order.
    pub fn leaderboard(&self) -> Vec<&Participant> {
        let mut sorted: Vec<&Participant> = self.participants.iter().collect();
        sorted.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
        sorted
    }

    /// Sum of all participants' cumulative scores.
    pub fn total_points(&self) -> i64 {
        self.participants.iter().map(|p| p.score).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (GameState, ClubCatalog) {
        (GameState::default(), ClubCatalog::premier_league())
    }

    const FIVE: [&str; 5] = [
        "Manchester City",
        "Arsenal",
        "Brighton & Hove Albion",
        "Fulham",
        "Brentford",
    ];

    #[test]
    fn assign_adds_in_draft_order() {
        let (mut state, catalog) = setup();
        assert_eq!(state.assign_club(1, "Fulham", &catalog), Ok(DraftOutcome::Added));
        assert_eq!(state.assign_club(1, "Arsenal", &catalog), Ok(DraftOutcome::Added));
        assert_eq!(state.participant(1).unwrap().teams, vec!["Fulham", "Arsenal"]);
    }

    #[test]
    fn assign_conflict_leaves_state_untouched() {
        let (mut state, catalog) = setup();
        state.assign_club(1, "Arsenal", &catalog).unwrap();
        let before = state.clone();

        let err = state.assign_club(2, "Arsenal", &catalog).unwrap_err();
        assert_eq!(
            err,
            DraftError::DraftConflict {
                club: "Arsenal".into(),
                owner: "Ashley".into()
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn conflict_checked_before_roster_full() {
        let (mut state, catalog) = setup();
        for club in FIVE {
            state.assign_club(2, club, &catalog).unwrap();
        }
        state.assign_club(1, "Chelsea", &catalog).unwrap();
        let err = state.assign_club(2, "Chelsea", &catalog).unwrap_err();
        assert!(matches!(err, DraftError::DraftConflict { .. }));
    }

    #[test]
    fn toggle_removes_even_when_full() {
        let (mut state, catalog) = setup();
        for club in FIVE {
            state.assign_club(1, club, &catalog).unwrap();
        }
        assert_eq!(
            state.assign_club(1, "Fulham", &catalog),
            Ok(DraftOutcome::Removed)
        );
        assert_eq!(state.participant(1).unwrap().teams.len(), 4);
        assert!(!state.participant(1).unwrap().owns("Fulham"));
    }

    #[test]
    fn sixth_club_is_rejected() {
        let (mut state, catalog) = setup();
        for club in FIVE {
            state.assign_club(1, club, &catalog).unwrap();
        }
        let before = state.clone();
        let err = state.assign_club(1, "Chelsea", &catalog).unwrap_err();
        assert_eq!(
            err,
            DraftError::RosterFull {
                participant: "Ashley".into(),
                max: 5
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn unknown_club_and_participant() {
        let (mut state, catalog) = setup();
        assert_eq!(
            state.assign_club(1, "Leicester City", &catalog),
            Err(DraftError::UnknownClub("Leicester City".into()))
        );
        assert_eq!(
            state.assign_club(9, "Arsenal", &catalog),
            Err(DraftError::UnknownParticipant(9))
        );
        assert_eq!(state.clear_roster(9), Err(DraftError::UnknownParticipant(9)));
    }

    #[test]
    fn clear_roster_frees_clubs_for_others() {
        let (mut state, catalog) = setup();
        state.assign_club(1, "Arsenal", &catalog).unwrap();
        state.clear_roster(1).unwrap();
        assert!(state.participant(1).unwrap().teams.is_empty());
        assert_eq!(state.assign_club(2, "Arsenal", &catalog), Ok(DraftOutcome::Added));
        assert_eq!(state.owner_of("Arsenal").unwrap().name, "Aaron");
    }

    #[test]
    fn finalize_requires_full_roster() {
        let (mut state, catalog) = setup();
        state.assign_club(3, "Everton", &catalog).unwrap();
        assert_eq!(
            state.finalize_selection(3),
            Err(DraftError::IncompleteRoster {
                participant: "Steve".into(),
                have: 1,
                need: 5
            })
        );
        for club in FIVE {
            state.assign_club(3, club, &catalog).ok();
        }
        // Everton + 4 of FIVE; the fifth of FIVE bounced off the cap.
        assert_eq!(state.participant(3).unwrap().teams.len(), 5);
        assert!(state.finalize_selection(3).is_ok());
    }

    #[test]
    fn select_participant_bounds() {
        let (mut state, _) = setup();
        assert!(state.select_participant(3));
        assert_eq!(state.current().unwrap().name, "Phil");
        assert!(!state.select_participant(4));
        assert_eq!(state.current_participant, 3);
    }

    #[test]
    fn leaderboard_sorts_by_score_then_id() {
        let (mut state, _) = setup();
        state.participants[0].score = 10;
        state.participants[1].score = 30;
        state.participants[2].score = 10;
        state.participants[3].score = 20;
        let names: Vec<&str> = state.leaderboard().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Aaron", "Phil", "Ashley", "Steve"]);
        assert_eq!(state.total_points(), 70);
    }

    #[test]
    fn leaderboard_ties_ignore_storage_order() {
        let (mut state, _) = setup();
        state.participants.reverse();
        for p in state.participants.iter_mut() {
            p.score = 12;
        }
        let ids: Vec<u32> = state.leaderboard().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
