// Integration tests for the application layer.
//
// These drive the public API end-to-end: the event loop receives user
// commands, the session is persisted to an on-disk database, exported to
// JSON and imported into a fresh state.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use matchday_app::app::{self, AppState, Clock};
use matchday_app::config::{Config, CredentialsConfig, DataPaths, FeedConfig, SeasonConfig};
use matchday_app::db::Database;
use matchday_app::feed::types::{Scorer, StandingRow};
use matchday_app::feed::{FeedError, FeedSource};
use matchday_app::protocol::{Notification, NotificationLevel, UiUpdate, UserCommand};
use matchday_core::club::ClubCatalog;
use matchday_core::fixture::MatchResult;

// ===========================================================================
// Test helpers
// ===========================================================================

/// A feed with no API key: every request fails.
struct OfflineFeed;

#[async_trait]
impl FeedSource for OfflineFeed {
    async fn fetch_matches(
        &self,
        _week: u32,
        _today: NaiveDate,
    ) -> Result<Vec<MatchResult>, FeedError> {
        Err(FeedError::MissingApiKey)
    }

    async fn fetch_standings(&self) -> Result<Vec<StandingRow>, FeedError> {
        Err(FeedError::MissingApiKey)
    }

    async fn fetch_scorers(&self) -> Result<Vec<Scorer>, FeedError> {
        Err(FeedError::MissingApiKey)
    }
}

fn test_config() -> Config {
    Config {
        season: SeasonConfig {
            name: "2025-26".into(),
            start: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 5, 24).unwrap(),
        },
        feed: FeedConfig::default(),
        credentials: CredentialsConfig::default(),
        db_path: String::new(),
        data: DataPaths::default(),
    }
}

fn in_season() -> DateTime<Utc> {
    "2025-10-04T14:00:00Z".parse().unwrap()
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("matchday_it_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn new_state(db_path: &str, seed: u64) -> AppState {
    AppState::new(
        test_config(),
        ClubCatalog::premier_league(),
        Database::open(db_path).unwrap(),
        Box::new(OfflineFeed),
        StdRng::seed_from_u64(seed),
        Clock::Fixed(in_season()),
    )
}

/// Run the event loop over `commands` (a Quit is appended) and return every
/// notification it produced.
async fn drive(state: AppState, commands: Vec<UserCommand>) -> Vec<Notification> {
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, mut ui_rx) = mpsc::channel(1024);

    let handle = tokio::spawn(app::run(cmd_rx, ui_tx, state));
    for cmd in commands {
        cmd_tx.send(cmd).await.unwrap();
    }
    cmd_tx.send(UserCommand::Quit).await.unwrap();
    assert!(handle.await.unwrap().is_ok());

    let mut notifications = Vec::new();
    while let Some(update) = ui_rx.recv().await {
        if let UiUpdate::Notification(n) = update {
            notifications.push(n);
        }
    }
    notifications
}

// ===========================================================================
// Session flow
// ===========================================================================

#[tokio::test]
async fn draft_simulate_export_and_recover() {
    let dir = temp_dir("flow");
    let db_path = dir.join("matchday.db").to_string_lossy().into_owned();
    let export_path = dir.join("week8.json");

    let mut state = new_state(&db_path, 1);
    state.initialize().await.unwrap();
    // Offline first run: the demo draft is loaded
    assert_eq!(state.game.participants[0].teams.len(), 5);
    let starting_total: i64 = state.game.participants.iter().map(|p| p.score).sum();
    assert_eq!(starting_total, 143);

    let notes = drive(
        state,
        vec![
            UserCommand::SelectParticipant(0),
            UserCommand::ToggleClub("Arsenal".into()),
            UserCommand::SaveSelection,
            UserCommand::SelectParticipant(1),
            UserCommand::ToggleClub("Manchester City".into()),
            UserCommand::SelectParticipant(0),
            UserCommand::ToggleClub("Arsenal".into()),
            UserCommand::SaveSelection,
            UserCommand::SimulateWeek,
            UserCommand::Export(Some(export_path.clone())),
        ],
    )
    .await;

    let exported = format!("Data exported to {}", export_path.display());
    let messages: Vec<&str> = notes.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Ashley must select exactly 5 clubs, currently has 4",
            "Manchester City has already been picked by Ashley",
            "Selection saved for Ashley!",
            "Gameweek 8 simulated! Points updated.",
            exported.as_str(),
        ]
    );
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[2].level, NotificationLevel::Success);

    // Restart against the same database
    let db = Database::open(&db_path).unwrap();
    let saved = db.load_snapshot().unwrap().expect("session saved");
    assert_eq!(saved.current_week, 9);
    assert_eq!(saved.participants[0].teams.last().unwrap(), "Arsenal");
    assert_eq!(db.load_score_history(None).unwrap().len(), 4);

    let mut restarted = new_state(&db_path, 2);
    restarted.initialize().await.unwrap();
    assert_eq!(restarted.game.current_week, 9);
    assert_eq!(restarted.game.participants, saved.participants);

    // Import the export into a state with its own database
    let other_db = dir.join("other.db").to_string_lossy().into_owned();
    let mut fresh = new_state(&other_db, 3);
    let report = fresh.import(&export_path).unwrap();
    assert!(report.is_clean());
    assert_eq!(fresh.game.participants, saved.participants);
    assert_eq!(fresh.game.current_week, 9);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn auto_refresh_toggle_is_reflected_in_snapshots() {
    let dir = temp_dir("auto");
    let db_path = dir.join("matchday.db").to_string_lossy().into_owned();

    let state = new_state(&db_path, 4);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (ui_tx, mut ui_rx) = mpsc::channel(64);
    let handle = tokio::spawn(app::run(cmd_rx, ui_tx, state));

    cmd_tx.send(UserCommand::SetAutoRefresh(false)).await.unwrap();
    cmd_tx.send(UserCommand::Quit).await.unwrap();
    assert!(handle.await.unwrap().is_ok());

    let mut last_auto = None;
    while let Some(update) = ui_rx.recv().await {
        if let UiUpdate::StateSnapshot(snapshot) = update {
            last_auto = Some(snapshot.auto_refresh);
        }
    }
    assert_eq!(last_auto, Some(false));

    std::fs::remove_dir_all(&dir).ok();
}
