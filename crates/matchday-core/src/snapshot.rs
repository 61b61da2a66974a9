// Session snapshot: the JSON form used for persistence, export and import.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::draft::GameState;
use crate::participant::{Participant, MAX_ROSTER};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Serialized game state.
///
/// Older export files used `players` and `exportDate`; both are accepted on
/// read and written back under the current names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(alias = "players")]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub current_week: u32,
    /// Hand-written files may leave this out; they are stamped on read.
    #[serde(alias = "exportDate", default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "currentPlayerIndex")]
    pub current_participant_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

impl Snapshot {
    pub fn capture(state: &GameState, season: Option<&str>, now: DateTime<Utc>) -> Self {
        Snapshot {
            participants: state.participants.clone(),
            current_week: state.current_week,
            timestamp: now,
            current_participant_index: Some(state.current_participant),
            season: season.map(str::to_string),
        }
    }

    /// Rebuild the game state verbatim. An out-of-range participant index
    /// falls back to the first participant.
    pub fn to_state(&self) -> GameState {
        let mut state = GameState::new(self.participants.clone(), self.current_week);
        if let Some(idx) = self.current_participant_index {
            state.select_participant(idx);
        }
        state
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Restore the roster invariants on data from outside the program.
    ///
    /// A club claimed by several participants stays with the first one in
    /// participant order. Rosters over the cap keep their first clubs.
    /// Duplicate achievements collapse to one.
    pub fn repair(&mut self) -> ImportReport {
        let mut report = ImportReport::default();
        let mut claimed: Vec<(String, String)> = Vec::new();

        for participant in self.participants.iter_mut() {
            let mut kept: Vec<String> = Vec::with_capacity(participant.teams.len());
            for club in participant.teams.drain(..) {
                if kept.contains(&club) {
                    continue;
                }
                if let Some((_, owner)) = claimed.iter().find(|(c, _)| *c == club) {
                    report.repairs.push(Repair::DuplicateOwner {
                        club: club.clone(),
                        kept_by: owner.clone(),
                        dropped_from: participant.name.clone(),
                    });
                    continue;
                }
                kept.push(club);
            }

            if kept.len() > MAX_ROSTER {
                let dropped = kept.split_off(MAX_ROSTER);
                report.repairs.push(Repair::RosterTruncated {
                    participant: participant.name.clone(),
                    dropped,
                });
            }
            for club in &kept {
                claimed.push((club.clone(), participant.name.clone()));
            }
            participant.teams = kept;

            let mut badges: Vec<String> = Vec::with_capacity(participant.achievements.len());
            for label in participant.achievements.drain(..) {
                if badges.contains(&label) {
                    report.repairs.push(Repair::DuplicateAchievement {
                        participant: participant.name.clone(),
                        label,
                    });
                } else {
                    badges.push(label);
                }
            }
            participant.achievements = badges;
        }

        for repair in &report.repairs {
            warn!("Import repair: {}", repair);
        }
        report
    }
}

/// One change made while repairing an imported snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    DuplicateOwner {
        club: String,
        kept_by: String,
        dropped_from: String,
    },
    RosterTruncated {
        participant: String,
        dropped: Vec<String>,
    },
    DuplicateAchievement {
        participant: String,
        label: String,
    },
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repair::DuplicateOwner {
                club,
                kept_by,
                dropped_from,
            } => write!(f, "{club} kept by {kept_by}, removed from {dropped_from}"),
            Repair::RosterTruncated {
                participant,
                dropped,
            } => write!(f, "{participant} over {MAX_ROSTER} clubs, dropped {}", dropped.join(", ")),
            Repair::DuplicateAchievement { participant, label } => {
                write!(f, "duplicate '{label}' removed from {participant}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub repairs: Vec<Repair>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty()
    }
}

/// `fantasy-pl-{season}-week-{week}.json`
pub fn default_export_filename(season: &str, week: u32) -> String {
    format!("fantasy-pl-{season}-week-{week}.json")
}

/// Write a snapshot as pretty JSON.
pub fn export_to(path: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let json = snapshot.to_json_pretty()?;
    std::fs::write(path, json).map_err(|e| SnapshotError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Read and repair a snapshot file.
pub fn import_from(path: &Path) -> Result<(Snapshot, ImportReport), SnapshotError> {
    let json = std::fs::read_to_string(path).map_err(|e| SnapshotError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut snapshot = Snapshot::from_json(&json)?;
    let report = snapshot.repair();
    Ok((snapshot, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::default_participants;

    fn ts() -> DateTime<Utc> {
        "2025-09-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn capture_writes_camel_case_keys() {
        let mut state = GameState::default();
        state.current_week = 3;
        state.select_participant(2);
        let snap = Snapshot::capture(&state, Some("2025-26"), ts());
        let json: serde_json::Value = serde_json::from_str(&snap.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["currentWeek"], 3);
        assert_eq!(json["currentParticipantIndex"], 2);
        assert_eq!(json["season"], "2025-26");
        assert_eq!(json["participants"].as_array().unwrap().len(), 4);
        assert_eq!(snap.to_state(), state);
    }

    #[test]
    fn legacy_export_keys_are_accepted() {
        let json = r#"{
            "players": [{"id": 1, "name": "Ashley", "avatar": "A", "score": 45,
                         "teams": ["Arsenal"], "weeklyPoints": 12, "achievements": []}],
            "currentWeek": 4,
            "season": "2025-26",
            "exportDate": "2025-09-10T08:00:00.000Z"
        }"#;
        let snap = Snapshot::from_json(json).unwrap();
        assert_eq!(snap.participants[0].score, 45);
        assert_eq!(snap.current_week, 4);
        assert_eq!(snap.current_participant_index, None);
        assert_eq!(snap.to_state().current_participant, 0);
    }

    #[test]
    fn timestamp_may_be_omitted() {
        let before = Utc::now();
        let json = r#"{
            "players": [{"id": 1, "name": "Ashley", "avatar": "A", "teams": ["Arsenal"]}],
            "currentWeek": 5
        }"#;
        let snap = Snapshot::from_json(json).unwrap();
        assert_eq!(snap.current_week, 5);
        assert_eq!(snap.participants[0].teams, vec!["Arsenal".to_string()]);
        assert!(snap.timestamp >= before);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Snapshot::from_json("{\"participants\": 3}"),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn repair_keeps_first_owner_of_duplicate_club() {
        let mut participants = default_participants();
        participants[0].teams = vec!["Arsenal".into(), "Fulham".into()];
        participants[2].teams = vec!["Everton".into(), "Arsenal".into()];
        let mut snap = Snapshot {
            participants,
            current_week: 1,
            timestamp: ts(),
            current_participant_index: None,
            season: None,
        };

        let report = snap.repair();
        assert_eq!(snap.participants[0].teams, vec!["Arsenal", "Fulham"]);
        assert_eq!(snap.participants[2].teams, vec!["Everton"]);
        assert_eq!(
            report.repairs,
            vec![Repair::DuplicateOwner {
                club: "Arsenal".into(),
                kept_by: "Ashley".into(),
                dropped_from: "Steve".into(),
            }]
        );
    }

    #[test]
    fn repair_truncates_and_dedupes() {
        let mut participants = default_participants();
        participants[1].teams = ["A", "B", "C", "D", "E", "F", "A"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        participants[1].achievements = vec!["Top 4".into(), "Top 4".into()];
        let mut snap = Snapshot {
            participants,
            current_week: 0,
            timestamp: ts(),
            current_participant_index: Some(9),
            season: None,
        };

        let report = snap.repair();
        assert_eq!(snap.participants[1].teams, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(snap.participants[1].achievements, vec!["Top 4"]);
        assert_eq!(report.repairs.len(), 2);
        assert!(!report.is_clean());
        assert_eq!(snap.to_state().current_participant, 0);
    }

    #[test]
    fn truncated_clubs_are_free_for_later_participants() {
        let mut participants = default_participants();
        participants[0].teams = ["A", "B", "C", "D", "E", "F"].iter().map(|s| s.to_string()).collect();
        participants[1].teams = vec!["F".into()];
        let mut snap = Snapshot {
            participants,
            current_week: 0,
            timestamp: ts(),
            current_participant_index: None,
            season: None,
        };
        snap.repair();
        assert_eq!(snap.participants[1].teams, vec!["F"]);
    }

    #[test]
    fn export_filename() {
        assert_eq!(
            default_export_filename("2025-26", 7),
            "fantasy-pl-2025-26-week-7.json"
        );
    }

    #[test]
    fn export_then_import_file() {
        let dir = std::env::temp_dir().join(format!("matchday-snap-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("export.json");

        let snap = Snapshot::capture(&GameState::default(), Some("2025-26"), ts());
        export_to(&path, &snap).unwrap();
        let (loaded, report) = import_from(&path).unwrap();
        assert_eq!(loaded, snap);
        assert!(report.is_clean());

        let missing = dir.join("missing.json");
        assert!(matches!(import_from(&missing), Err(SnapshotError::Io { .. })));
        std::fs::remove_dir_all(&dir).ok();
    }
}
