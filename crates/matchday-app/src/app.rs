// Application state and orchestration logic.
//
// The central event loop that owns the game state, runs engine operations in
// response to user commands, refreshes the football feeds, and pushes UI
// updates to the TUI render loop.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use matchday_core::club::ClubCatalog;
use matchday_core::draft::{DraftError, DraftOutcome, GameState};
use matchday_core::fixture::MatchResult;
use matchday_core::participant::BONUS_ACHIEVEMENTS;
use matchday_core::scoring::{apply_weekly_scores, club_score_breakdown, compute_team_value};
use matchday_core::snapshot::{self, ImportReport, Snapshot, SnapshotError};

use crate::config::Config;
use crate::db::Database;
use crate::feed::fallback;
use crate::feed::{load_feeds, DataSource, FeedSource, Feeds, Sourced};
use crate::protocol::{
    AppSnapshot, ConnectionStatus, Notification, NotificationLevel, ParticipantSummary, UiUpdate,
    UserCommand,
};
use crate::season::SeasonCalendar;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Probability that a participant earns a random bonus badge in a simulated
/// gameweek.
pub const BONUS_ACHIEVEMENT_CHANCE: f64 = 0.1;

/// Simulated fixtures get ids far above anything the live feed uses so a
/// later merge never collides.
const SIMULATED_ID_BASE: u64 = 9_000_000_000;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now". Tests pin it to a date inside or outside the season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub catalog: ClubCatalog,
    pub season: SeasonCalendar,
    pub game: GameState,
    pub feeds: Feeds,
    pub db: Database,
    pub source: Box<dyn FeedSource>,
    pub rng: StdRng,
    pub auto_refresh: bool,
    pub connection_status: ConnectionStatus,
    pub clock: Clock,
    /// Directory for exports written without an explicit path.
    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: ClubCatalog,
        db: Database,
        source: Box<dyn FeedSource>,
        rng: StdRng,
        clock: Clock,
    ) -> Self {
        let season = SeasonCalendar::from(&config.season);
        let now = clock.now();
        let week = season.current_gameweek(now.date_naive());
        AppState {
            auto_refresh: config.feed.auto_refresh,
            game: GameState::new(matchday_core::participant::default_participants(), week),
            feeds: Feeds {
                matches: Sourced::Placeholder(Vec::new()),
                standings: Sourced::Placeholder(Vec::new()),
                scorers: Sourced::Placeholder(Vec::new()),
                fetched_at: now,
            },
            config,
            catalog,
            season,
            db,
            source,
            rng,
            connection_status: ConnectionStatus::Connecting,
            clock,
            export_dir: PathBuf::from("."),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn season_started(&self) -> bool {
        self.season.is_started(self.now().date_naive())
    }

    /// Restore or seed the session, then load the feeds.
    ///
    /// A saved session is restored as-is. Without one, and without a live
    /// match feed, the demo draft is loaded so the dashboard has something
    /// to show.
    pub async fn initialize(&mut self) -> anyhow::Result<()> {
        let recovered = recover_from_db(self)?;
        self.refresh_feeds().await;

        if !recovered && !self.feeds.matches.is_live() {
            info!("No saved session and no live feed, loading demo draft");
            self.game.participants = fallback::sample_rosters(self.season_started());
        }
        self.persist()?;
        Ok(())
    }

    /// Build an `AppSnapshot` from the current application state.
    pub fn build_snapshot(&self) -> AppSnapshot {
        let today = self.now().date_naive();
        let matches = self.feeds.matches.value();
        let participants = self
            .game
            .participants
            .iter()
            .map(|p| ParticipantSummary {
                team_value: compute_team_value(p, &self.catalog),
                breakdown: club_score_breakdown(p, matches, &self.catalog),
                participant: p.clone(),
            })
            .collect();

        AppSnapshot {
            participants,
            current_participant: self.game.current_participant,
            current_week: self.game.current_week,
            season_name: self.season.name.clone(),
            season_started: self.season.is_started(today),
            days_until_start: self.season.days_until_start(today),
            clubs: self.catalog.clubs().to_vec(),
            matches: matches.clone(),
            standings: self.feeds.standings.value().clone(),
            scorers: self.feeds.scorers.value().clone(),
            data_source: self.feeds.source(),
            auto_refresh: self.auto_refresh,
            last_update: Some(self.feeds.fetched_at),
        }
    }

    /// Write the current session to the database.
    pub fn persist(&self) -> anyhow::Result<()> {
        let snap = Snapshot::capture(&self.game, Some(&self.season.name), self.now());
        self.db.save_snapshot(&snap)
    }

    /// Reload all feeds and update the connection status.
    pub async fn refresh_feeds(&mut self) -> DataSource {
        self.connection_status = ConnectionStatus::Connecting;
        let now = self.now();
        let feeds = load_feeds(
            self.source.as_ref(),
            &self.catalog,
            &self.season,
            now,
            &mut self.rng,
        )
        .await;
        let source = feeds.source();
        self.feeds = feeds;
        self.connection_status = match source {
            DataSource::Live | DataSource::Mixed => ConnectionStatus::Connected,
            DataSource::Placeholder if self.config.api_key().is_none() => ConnectionStatus::Offline,
            DataSource::Placeholder => ConnectionStatus::Error,
        };
        source
    }

    /// Draft or release a club for the current participant.
    pub fn toggle_club(&mut self, club: &str) -> Result<DraftOutcome, DraftError> {
        let id = self.current_participant_id()?;
        self.game.assign_club(id, club, &self.catalog)
    }

    fn current_participant_id(&self) -> Result<u32, DraftError> {
        self.game
            .current()
            .map(|p| p.id)
            .ok_or(DraftError::UnknownParticipant(self.game.current_participant as u32))
    }

    /// Score the current match list and log the deltas. The session is only
    /// updated once the deltas are recorded.
    pub fn calculate_points(&mut self) -> anyhow::Result<Vec<(u32, i64)>> {
        let results = self.feeds.matches.value().clone();
        let mut next = self.game.clone();
        let deltas = self.score_results(&mut next, &results)?;
        self.game = next;
        Ok(deltas)
    }

    /// Apply `results` to `game` and append the deltas to the score history.
    fn score_results(
        &self,
        game: &mut GameState,
        results: &[MatchResult],
    ) -> anyhow::Result<Vec<(u32, i64)>> {
        let deltas = apply_weekly_scores(game, results, &self.catalog);
        self.db.record_scores(game.current_week, &deltas, self.now())?;
        Ok(deltas)
    }

    /// Play a random full round, score it, hand out random bonus badges and
    /// advance the week. Returns the week that was simulated.
    pub fn simulate_week(&mut self) -> anyhow::Result<u32> {
        let week = self.game.current_week;
        let first_id = SIMULATED_ID_BASE + week as u64 * 100;
        let results = fallback::simulate_gameweek(&self.catalog, first_id, self.now(), &mut self.rng);
        let mut next = self.game.clone();
        self.score_results(&mut next, &results)?;

        for participant in next.participants.iter_mut() {
            if self.rng.gen_bool(BONUS_ACHIEVEMENT_CHANCE) {
                if let Some(label) = BONUS_ACHIEVEMENTS.choose(&mut self.rng) {
                    if participant.award(label) {
                        info!("{} earned bonus badge {}", participant.name, label);
                    }
                }
            }
        }

        next.current_week += 1;
        self.game = next;
        info!("Gameweek {} simulated", week);
        Ok(week)
    }

    /// One auto-update tick. Placeholder matches advance a simulated minute;
    /// live matches in play are re-fetched. Returns whether anything changed.
    pub async fn auto_tick(&mut self) -> bool {
        if !self.auto_refresh {
            return false;
        }
        match &mut self.feeds.matches {
            Sourced::Placeholder(matches) => {
                if !matches.iter().any(|m| m.status.is_live()) {
                    return false;
                }
                let finished = fallback::advance_live_matches(matches, &mut self.rng);
                if finished > 0 {
                    debug!("{} placeholder matches finished", finished);
                }
                true
            }
            Sourced::Live(matches) => {
                if !matches.iter().any(|m| m.status.is_live()) {
                    return false;
                }
                let week = self.game.current_week;
                let today = self.clock.now().date_naive();
                match self.source.fetch_matches(week, today).await {
                    Ok(fresh) => {
                        *matches = fresh;
                        self.feeds.fetched_at = self.clock.now();
                        true
                    }
                    Err(e) => {
                        warn!("Live match refresh failed: {}", e);
                        false
                    }
                }
            }
        }
    }

    /// Write the session as pretty JSON. Without a path the default file name
    /// is used inside `export_dir`.
    pub fn export(&self, path: Option<PathBuf>) -> Result<PathBuf, SnapshotError> {
        let path = path.unwrap_or_else(|| {
            self.export_dir.join(snapshot::default_export_filename(
                &self.season.name,
                self.game.current_week,
            ))
        });
        let snap = Snapshot::capture(&self.game, Some(&self.season.name), self.now());
        snapshot::export_to(&path, &snap)?;
        info!("Exported session to {}", path.display());
        Ok(path)
    }

    /// Replace the session with a repaired snapshot from `path`.
    pub fn import(&mut self, path: &Path) -> Result<ImportReport, SnapshotError> {
        let (snap, report) = snapshot::import_from(path)?;
        if let Some(season) = snap.season.as_deref() {
            if season != self.season.name {
                warn!(
                    "Imported file is from season {}, current season is {}",
                    season, self.season.name
                );
            }
        }
        self.game = snap.to_state();
        info!(
            "Imported {} participants from {} ({} repairs)",
            self.game.participants.len(),
            path.display(),
            report.repairs.len()
        );
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two sources using `tokio::select!`:
/// 1. User commands from the TUI
/// 2. The auto-update interval
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let _ = ui_tx
        .send(UiUpdate::ConnectionStatus(state.connection_status))
        .await;
    publish_snapshot(&state, &ui_tx).await;

    let period = Duration::from_secs(state.config.feed.refresh_interval_secs.max(1));
    let mut refresh_interval = tokio::time::interval(period);
    // The first tick completes immediately; consume it so the first
    // real update happens after one full interval.
    refresh_interval.tick().await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            _ = refresh_interval.tick() => {
                if state.auto_tick().await {
                    publish_snapshot(&state, &ui_tx).await;
                }
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

async fn publish_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx
        .send(UiUpdate::StateSnapshot(Box::new(snapshot)))
        .await;
}

async fn notify(ui_tx: &mpsc::Sender<UiUpdate>, notification: Notification) {
    let _ = ui_tx.send(UiUpdate::Notification(notification)).await;
}

/// Persist after a mutation, then publish the new state. A failed save is
/// reported but does not undo the change.
async fn commit(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    if let Err(e) = state.persist() {
        warn!("Failed to save session: {:#}", e);
        notify(ui_tx, Notification::error(format!("Could not save session: {e}"))).await;
    }
    publish_snapshot(state, ui_tx).await;
}

/// Handle a user command from the TUI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::SelectParticipant(index) => {
            if state.game.select_participant(index) {
                debug!("Drafting participant is now index {}", index);
                commit(state, ui_tx).await;
            }
        }
        UserCommand::ToggleClub(club) => match state.toggle_club(&club) {
            Ok(_) => commit(state, ui_tx).await,
            Err(e) => notify(ui_tx, Notification::error(e.to_string())).await,
        },
        UserCommand::ClearRoster => {
            let Ok(id) = state.current_participant_id() else {
                return;
            };
            if state.game.clear_roster(id).is_ok() {
                let name = state
                    .game
                    .participant(id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                commit(state, ui_tx).await;
                notify(ui_tx, Notification::info(format!("Selection cleared for {name}"))).await;
            }
        }
        UserCommand::SaveSelection => {
            let Ok(id) = state.current_participant_id() else {
                return;
            };
            match state.game.finalize_selection(id) {
                Ok(()) => {
                    let name = state
                        .game
                        .participant(id)
                        .map(|p| p.name.clone())
                        .unwrap_or_default();
                    commit(state, ui_tx).await;
                    notify(ui_tx, Notification::success(format!("Selection saved for {name}!")))
                        .await;
                }
                Err(e) => notify(ui_tx, Notification::error(e.to_string())).await,
            }
        }
        UserCommand::CalculatePoints => match state.calculate_points() {
            Ok(_) => {
                commit(state, ui_tx).await;
                notify(
                    ui_tx,
                    Notification::success("Points calculated based on current results"),
                )
                .await;
            }
            Err(e) => {
                warn!("Scoring failed: {:#}", e);
                notify(ui_tx, Notification::error(format!("Could not record scores: {e}"))).await;
            }
        },
        UserCommand::SimulateWeek => match state.simulate_week() {
            Ok(week) => {
                commit(state, ui_tx).await;
                notify(
                    ui_tx,
                    Notification::new(
                        NotificationLevel::Success,
                        "Gameweek Complete",
                        format!("Gameweek {week} simulated! Points updated."),
                    ),
                )
                .await;
            }
            Err(e) => {
                warn!("Simulation failed: {:#}", e);
                notify(ui_tx, Notification::error(format!("Could not record scores: {e}"))).await;
            }
        },
        UserCommand::ForceRefresh => {
            let _ = ui_tx
                .send(UiUpdate::ConnectionStatus(ConnectionStatus::Connecting))
                .await;
            let source = state.refresh_feeds().await;
            let _ = ui_tx
                .send(UiUpdate::ConnectionStatus(state.connection_status))
                .await;
            publish_snapshot(state, ui_tx).await;
            let notification = match (source, state.connection_status) {
                (DataSource::Live, _) => Notification::success("Data updated successfully"),
                (DataSource::Mixed, _) => Notification::new(
                    NotificationLevel::Warning,
                    "Partial update",
                    "Some feeds are unavailable; showing placeholder data for them",
                ),
                (DataSource::Placeholder, ConnectionStatus::Offline) => {
                    Notification::info("No API key configured; showing placeholder data")
                }
                (DataSource::Placeholder, _) => Notification::error("Could not update data"),
            };
            notify(ui_tx, notification).await;
        }
        UserCommand::SetAutoRefresh(enabled) => {
            state.auto_refresh = enabled;
            info!("Auto refresh {}", if enabled { "enabled" } else { "disabled" });
            publish_snapshot(state, ui_tx).await;
        }
        UserCommand::Export(path) => match state.export(path) {
            Ok(written) => {
                notify(
                    ui_tx,
                    Notification::success(format!("Data exported to {}", written.display())),
                )
                .await;
            }
            Err(e) => notify(ui_tx, Notification::error(format!("Export failed: {e}"))).await,
        },
        UserCommand::Import(path) => match state.import(&path) {
            Ok(report) => {
                commit(state, ui_tx).await;
                let message = if report.is_clean() {
                    "Data imported successfully".to_string()
                } else {
                    format!(
                        "Data imported with {} correction(s); see the log for details",
                        report.repairs.len()
                    )
                };
                notify(ui_tx, Notification::success(message)).await;
            }
            Err(e) => {
                warn!("Import of {} failed: {}", path.display(), e);
                notify(
                    ui_tx,
                    Notification::error(format!(
                        "Error importing data. Please verify the file is valid. ({e})"
                    )),
                )
                .await;
            }
        },
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

// ---------------------------------------------------------------------------
// Session recovery
// ---------------------------------------------------------------------------

/// Restore the saved session from the database.
///
/// The stored snapshot was written by this program, so it is applied without
/// repair. Returns `false` when there is nothing to restore; a session that
/// no longer parses is discarded along with its score history.
pub fn recover_from_db(state: &mut AppState) -> anyhow::Result<bool> {
    let snap = match state.db.load_snapshot() {
        Ok(Some(snap)) => snap,
        Ok(None) => {
            info!("No saved session, starting fresh");
            return Ok(false);
        }
        Err(e) => {
            warn!("Discarding unreadable saved session: {:#}", e);
            if let Err(e) = state.db.clear_session() {
                warn!("Failed to clear saved session: {:#}", e);
            }
            return Ok(false);
        }
    };

    state.game = snap.to_state();
    info!(
        "Session restored: week {}, {} participants, saved {}",
        state.game.current_week,
        state.game.participants.len(),
        snap.timestamp
    );
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CredentialsConfig, DataPaths, FeedConfig, SeasonConfig};
    use crate::db::SESSION_KEY;
    use crate::feed::tests::StubFeed;
    use chrono::NaiveDate;
    use matchday_core::fixture::{MatchStatus, Score};
    use matchday_core::participant::UNDERDOG_VICTORY;
    use rand::SeedableRng;

    // -----------------------------------------------------------------------
    // Test helpers
    // -----------------------------------------------------------------------

    fn test_config() -> Config {
        Config {
            season: SeasonConfig {
                name: "2025-26".into(),
                start: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 5, 24).unwrap(),
            },
            feed: FeedConfig::default(),
            credentials: CredentialsConfig::default(),
            db_path: ":memory:".into(),
            data: DataPaths::default(),
        }
    }

    fn in_season() -> DateTime<Utc> {
        "2025-10-04T14:00:00Z".parse().unwrap()
    }

    fn pre_season() -> DateTime<Utc> {
        "2025-07-20T09:00:00Z".parse().unwrap()
    }

    fn create_state_with(source: StubFeed, clock: Clock) -> AppState {
        AppState::new(
            test_config(),
            ClubCatalog::premier_league(),
            Database::open(":memory:").unwrap(),
            Box::new(source),
            StdRng::seed_from_u64(42),
            clock,
        )
    }

    fn create_test_app_state() -> AppState {
        create_state_with(StubFeed::offline(), Clock::Fixed(in_season()))
    }

    fn finished(id: u64, home: &str, away: &str, h: u32, a: u32) -> MatchResult {
        MatchResult {
            id,
            home: home.into(),
            away: away.into(),
            score: Some(Score { home: h, away: a }),
            status: MatchStatus::Finished,
            minute: None,
            kickoff: in_season(),
        }
    }

    /// Drain everything currently queued on the UI channel.
    fn drain(ui_rx: &mut mpsc::Receiver<UiUpdate>) -> Vec<UiUpdate> {
        let mut out = Vec::new();
        while let Ok(u) = ui_rx.try_recv() {
            out.push(u);
        }
        out
    }

    fn notifications(updates: &[UiUpdate]) -> Vec<&Notification> {
        updates
            .iter()
            .filter_map(|u| match u {
                UiUpdate::Notification(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Tests: initialization and recovery
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn fresh_start_offline_loads_demo_draft() {
        let mut state = create_test_app_state();
        state.initialize().await.unwrap();

        assert_eq!(state.game.current_week, 8);
        assert_eq!(state.game.participants[0].score, 45);
        assert_eq!(state.game.participants[3].teams.len(), 5);
        assert_eq!(state.connection_status, ConnectionStatus::Offline);
        assert_eq!(state.feeds.source(), DataSource::Placeholder);
        assert!(state.db.load_snapshot().unwrap().is_some());
    }

    #[tokio::test]
    async fn pre_season_demo_draft_has_zero_scores() {
        let mut state = create_state_with(StubFeed::offline(), Clock::Fixed(pre_season()));
        state.initialize().await.unwrap();

        assert_eq!(state.game.current_week, 0);
        assert!(state.game.participants.iter().all(|p| p.score == 0));
        assert!(state.feeds.matches.value().is_empty());
        let snap = state.build_snapshot();
        assert!(!snap.season_started);
        assert_eq!(snap.days_until_start, 26);
    }

    #[tokio::test]
    async fn live_feed_without_session_starts_empty() {
        let stub = StubFeed {
            matches: Some(vec![finished(1, "Arsenal", "Chelsea", 2, 0)]),
            standings: Some(vec![]),
            scorers: Some(vec![]),
        };
        let mut state = create_state_with(stub, Clock::Fixed(in_season()));
        state.initialize().await.unwrap();

        assert!(state.game.participants.iter().all(|p| p.teams.is_empty()));
        assert_eq!(state.connection_status, ConnectionStatus::Connected);
    }

    #[test]
    fn crash_recovery_restores_state() {
        let mut state = create_test_app_state();
        state.toggle_club("Arsenal").unwrap();
        state.game.select_participant(2);
        state.game.current_week = 12;
        state.persist().unwrap();

        let db = std::mem::replace(&mut state.db, Database::open(":memory:").unwrap());
        let mut restored = create_test_app_state();
        restored.db = db;

        assert!(recover_from_db(&mut restored).unwrap());
        assert_eq!(restored.game, state.game);
    }

    #[test]
    fn crash_recovery_without_session_returns_false() {
        let mut state = create_test_app_state();
        assert!(!recover_from_db(&mut state).unwrap());
        assert_eq!(state.game.current_week, 8);
        assert!(state.game.participants.iter().all(|p| p.teams.is_empty()));
    }

    #[tokio::test]
    async fn unreadable_session_is_discarded_on_startup() {
        let mut state = create_test_app_state();
        state
            .db
            .save_state(SESSION_KEY, &serde_json::json!({"participants": "nope"}))
            .unwrap();
        state.db.record_scores(3, &[(1, 6)], in_season()).unwrap();

        state.initialize().await.unwrap();

        // Demo draft, and the stored session is readable again
        assert_eq!(state.game.participants[0].score, 45);
        let saved = state.db.load_snapshot().unwrap().unwrap();
        assert_eq!(saved.participants, state.game.participants);
        assert!(state.db.load_score_history(None).unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Tests: engine operations
    // -----------------------------------------------------------------------

    #[test]
    fn calculate_points_scores_current_matches_and_logs_history() {
        let mut state = create_test_app_state();
        state.game.select_participant(3);
        state.toggle_club("Burnley").unwrap();
        state.feeds.matches = Sourced::Live(vec![
            finished(1, "Burnley", "Liverpool", 1, 0),
            finished(2, "Arsenal", "Everton", 5, 0),
        ]);

        let deltas = state.calculate_points().unwrap();
        assert_eq!(deltas, vec![(1, 0), (2, 0), (3, 0), (4, 8)]);
        let phil = state.game.participant(4).unwrap();
        assert_eq!(phil.score, 8);
        assert!(phil.has_achievement(UNDERDOG_VICTORY));

        let history = state.db.load_score_history(Some(4)).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].week, 8);
        assert_eq!(history[0].points, 8);
    }

    #[test]
    fn simulate_week_advances_and_scores() {
        let mut state = create_test_app_state();
        state.game.participants = fallback::sample_rosters(false);

        let week = state.simulate_week().unwrap();
        assert_eq!(week, 8);
        assert_eq!(state.game.current_week, 9);

        // Every club played, so the log has one row per participant and the
        // cumulative scores equal this week's deltas.
        let history = state.db.load_score_history(None).unwrap();
        assert_eq!(history.len(), 4);
        for p in &state.game.participants {
            assert_eq!(p.score, p.weekly_points);
        }
    }

    /// A file-backed state whose score history table has been dropped, so
    /// every `record_scores` call fails.
    fn state_with_broken_history(name: &str) -> (AppState, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "matchday_app_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("matchday.db");

        let mut state = create_test_app_state();
        state.db = Database::open(path.to_str().unwrap()).unwrap();
        let other = rusqlite::Connection::open(&path).unwrap();
        other.execute_batch("DROP TABLE score_history;").unwrap();
        (state, dir)
    }

    #[test]
    fn failed_history_write_leaves_points_untouched() {
        let (mut state, dir) = state_with_broken_history("points");
        state.game.select_participant(3);
        state.toggle_club("Burnley").unwrap();
        state.feeds.matches = Sourced::Live(vec![finished(1, "Burnley", "Liverpool", 1, 0)]);
        let before = state.game.clone();

        assert!(state.calculate_points().is_err());
        assert_eq!(state.game, before);
        assert!(!state.game.participant(4).unwrap().has_achievement(UNDERDOG_VICTORY));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn failed_history_write_does_not_advance_week() {
        let (mut state, dir) = state_with_broken_history("simulate");
        state.game.participants = fallback::sample_rosters(true);
        let before = state.game.clone();

        assert!(state.simulate_week().is_err());
        assert_eq!(state.game, before);
        assert_eq!(state.game.current_week, 8);

        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        handle_user_command(&mut state, UserCommand::SimulateWeek, &ui_tx).await;
        let updates = drain(&mut ui_rx);
        let notes = notifications(&updates);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert!(notes[0].message.starts_with("Could not record scores"));
        assert_eq!(state.game, before);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn snapshot_carries_derived_values() {
        let mut state = create_test_app_state();
        state.toggle_club("Manchester City").unwrap();
        state.toggle_club("Burnley").unwrap();
        state.feeds.matches = Sourced::Live(vec![finished(1, "Burnley", "Fulham", 0, 2)]);

        let snap = state.build_snapshot();
        assert_eq!(snap.participants[0].team_value, 1250);
        assert_eq!(snap.participants[0].breakdown.len(), 1);
        assert_eq!(snap.participants[0].breakdown[0].total(), -1);
        assert_eq!(snap.owner_of("Burnley").unwrap().name, "Ashley");
        assert_eq!(snap.clubs.len(), 20);
        assert_eq!(snap.data_source, DataSource::Mixed);
    }

    #[tokio::test]
    async fn auto_tick_advances_placeholder_matches() {
        let mut state = create_test_app_state();
        state.refresh_feeds().await;
        let before: Vec<Option<u8>> = state.feeds.matches.value()[..2]
            .iter()
            .map(|m| m.minute)
            .collect();

        assert!(state.auto_tick().await);
        for (m, prev) in state.feeds.matches.value()[..2].iter().zip(before) {
            let prev = prev.unwrap();
            if prev < 90 {
                assert_eq!(m.minute, Some(prev + 1));
            }
        }

        state.auto_refresh = false;
        assert!(!state.auto_tick().await);
    }

    #[test]
    fn export_and_import_round_trip_with_repair() {
        let dir = std::env::temp_dir().join(format!("matchday_app_export_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut state = create_test_app_state();
        state.export_dir = dir.clone();
        state.toggle_club("Arsenal").unwrap();
        let path = state.export(None).unwrap();
        assert_eq!(path, dir.join("fantasy-pl-2025-26-week-8.json"));

        // Hand-edit the file so two participants claim Arsenal.
        let mut snap = Snapshot::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        snap.participants[1].teams.push("Arsenal".into());
        std::fs::write(&path, snap.to_json_pretty().unwrap()).unwrap();

        let mut other = create_test_app_state();
        let report = other.import(&path).unwrap();
        assert_eq!(report.repairs.len(), 1);
        assert_eq!(other.game.owner_of("Arsenal").unwrap().name, "Ashley");
        assert!(other.game.participant(2).unwrap().teams.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    // -----------------------------------------------------------------------
    // Tests: Async event loop
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn event_loop_handles_quit_command() {
        let state = create_test_app_state();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, _ui_rx) = mpsc::channel(64);

        let handle = tokio::spawn(run(cmd_rx, ui_tx, state));
        cmd_tx.send(UserCommand::Quit).await.unwrap();

        let result = handle.await.unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn draft_commands_notify_and_publish() {
        let mut state = create_test_app_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::ToggleClub("Arsenal".into()), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::SelectParticipant(1), &ui_tx).await;
        drain(&mut ui_rx);

        handle_user_command(&mut state, UserCommand::ToggleClub("Arsenal".into()), &ui_tx).await;
        let updates = drain(&mut ui_rx);
        let notes = notifications(&updates);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert_eq!(notes[0].message, "Arsenal has already been picked by Ashley");

        handle_user_command(&mut state, UserCommand::SaveSelection, &ui_tx).await;
        let updates = drain(&mut ui_rx);
        assert_eq!(
            notifications(&updates)[0].message,
            "Aaron must select exactly 5 clubs, currently has 0"
        );

        handle_user_command(&mut state, UserCommand::SelectParticipant(0), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::ClearRoster, &ui_tx).await;
        let updates = drain(&mut ui_rx);
        let notes = notifications(&updates);
        assert_eq!(notes[0].message, "Selection cleared for Ashley");
        assert_eq!(notes[0].level, NotificationLevel::Info);
        assert!(state.game.owner_of("Arsenal").is_none());

        // The saved session reflects the last command.
        let saved = state.db.load_snapshot().unwrap().unwrap();
        assert!(saved.participants[0].teams.is_empty());
    }

    #[tokio::test]
    async fn simulate_week_command_reports_week() {
        let mut state = create_test_app_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::SimulateWeek, &ui_tx).await;
        let updates = drain(&mut ui_rx);
        let notes = notifications(&updates);
        assert_eq!(notes[0].title, "Gameweek Complete");
        assert_eq!(notes[0].message, "Gameweek 8 simulated! Points updated.");
        assert!(updates
            .iter()
            .any(|u| matches!(u, UiUpdate::StateSnapshot(s) if s.current_week == 9)));
    }

    #[tokio::test]
    async fn bad_import_reports_error_and_keeps_state() {
        let mut state = create_test_app_state();
        state.toggle_club("Chelsea").unwrap();
        let before = state.game.clone();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        let path = std::env::temp_dir().join("matchday_app_bad_import.json");
        std::fs::write(&path, "not json").unwrap();
        handle_user_command(&mut state, UserCommand::Import(path.clone()), &ui_tx).await;

        let updates = drain(&mut ui_rx);
        assert_eq!(notifications(&updates)[0].level, NotificationLevel::Error);
        assert_eq!(state.game, before);
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn force_refresh_offline_reports_placeholder() {
        let mut state = create_test_app_state();
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        handle_user_command(&mut state, UserCommand::ForceRefresh, &ui_tx).await;
        let updates = drain(&mut ui_rx);
        assert!(matches!(
            updates.first(),
            Some(UiUpdate::ConnectionStatus(ConnectionStatus::Connecting))
        ));
        assert!(updates
            .iter()
            .any(|u| matches!(u, UiUpdate::ConnectionStatus(ConnectionStatus::Offline))));
        assert_eq!(
            notifications(&updates)[0].message,
            "No API key configured; showing placeholder data"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn event_loop_ticks_placeholder_matches() {
        let mut state = create_test_app_state();
        state.refresh_feeds().await;
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(64);

        let handle = tokio::spawn(run(cmd_rx, ui_tx, state));

        // Initial connection status and snapshot, then one snapshot per tick.
        assert!(matches!(ui_rx.recv().await, Some(UiUpdate::ConnectionStatus(_))));
        assert!(matches!(ui_rx.recv().await, Some(UiUpdate::StateSnapshot(_))));
        assert!(matches!(ui_rx.recv().await, Some(UiUpdate::StateSnapshot(_))));

        cmd_tx.send(UserCommand::Quit).await.unwrap();
        assert!(handle.await.unwrap().is_ok());
    }
}
