// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the latest `AppSnapshot`. The app
// loop pushes `UiUpdate` messages over an mpsc channel; the TUI applies them
// to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;

use matchday_app::protocol::{AppSnapshot, ConnectionStatus, Notification, TabId, UiUpdate, UserCommand};

use layout::{build_layout, AppLayout};

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// A notification and the moment it arrived.
#[derive(Debug, Clone)]
pub struct ShownNotification {
    pub notification: Notification,
    pub shown_at: Instant,
}

/// TUI-local state that mirrors the application state for rendering.
pub struct ViewState {
    /// Latest game state from the app loop. `None` until the first snapshot.
    pub snapshot: Option<AppSnapshot>,
    pub connection_status: ConnectionStatus,
    /// Which tab is active in the main panel.
    pub active_tab: TabId,
    pub notification: Option<ShownNotification>,
    /// Cursor row in the draft tab's club list.
    pub selected_club: usize,
    /// Per-tab scroll offsets (keyed by tab key).
    pub scroll_offset: HashMap<String, usize>,
    pub confirm_quit: bool,
    /// Whether the import path prompt is capturing input.
    pub import_mode: bool,
    pub import_path: String,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            snapshot: None,
            connection_status: ConnectionStatus::Connecting,
            active_tab: TabId::Leaderboard,
            notification: None,
            selected_club: 0,
            scroll_offset: HashMap::new(),
            confirm_quit: false,
            import_mode: false,
            import_path: String::new(),
        }
    }
}

impl ViewState {
    /// Replace the mirrored game state, keeping the club cursor in range.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        let clubs = snapshot.clubs.len();
        self.selected_club = self.selected_club.min(clubs.saturating_sub(1));
        self.snapshot = Some(snapshot);
    }

    /// The notification to draw at `now`, if one is still fresh.
    pub fn visible_notification(&self, now: Instant) -> Option<&Notification> {
        self.notification
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.shown_at) < NOTIFICATION_TTL)
            .map(|n| &n.notification)
    }

    /// Name of the club under the draft cursor.
    pub fn selected_club_name(&self) -> Option<&str> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.clubs.get(self.selected_club))
            .map(|c| c.name.as_str())
    }

    pub fn participant_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |s| s.participants.len())
    }

    pub fn scroll(&self, key: &str) -> usize {
        self.scroll_offset.get(key).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StateSnapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::Notification(notification) => {
            state.notification = Some(ShownNotification {
                notification,
                shown_at: Instant::now(),
            });
        }
        UiUpdate::ConnectionStatus(status) => {
            state.connection_status = status;
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete dashboard frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::banner::render(frame, layout.banner, state, Instant::now());
    render_main_panel(frame, &layout, state);
    widgets::roster::render(frame, layout.roster, state);
    widgets::leaderboard::render_compact(frame, layout.leaders, state);
    render_help_bar(frame, &layout, state);

    if state.confirm_quit {
        widgets::dialog::render_quit_confirm(frame, frame.area());
    } else if state.import_mode {
        widgets::dialog::render_import_prompt(frame, frame.area(), &state.import_path);
    }
}

fn render_main_panel(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let area = layout.main_panel;
    match state.active_tab {
        TabId::Leaderboard => widgets::leaderboard::render(frame, area, state),
        TabId::Participants => widgets::participants::render(frame, area, state),
        TabId::Draft => widgets::draft::render(frame, area, state),
        TabId::Live => widgets::matches::render_live(frame, area, state),
        TabId::Upcoming => widgets::matches::render_upcoming(frame, area, state),
        TabId::Standings => widgets::standings::render(frame, area, state),
        TabId::Scorers => widgets::scorers::render(frame, area, state),
    }
}

/// Key hints for the active tab.
pub fn help_text(state: &ViewState) -> &'static str {
    if state.import_mode {
        return " Enter:Import | Esc:Cancel";
    }
    match state.active_tab {
        TabId::Draft => {
            " j/k:Move | Enter:Pick/Drop | Tab:Participant | c:Clear | s:Save | q:Quit"
        }
        _ => {
            " 1-7:Tabs | Tab:Participant | p:Points | w:Sim week | r:Refresh | a:Auto | e:Export | i:Import | q:Quit"
        }
    }
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        help_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// Initializes the terminal, installs a panic hook that restores it, then
/// selects over UI updates, keyboard input and the render tick until the
/// user quits or the app loop closes its channel.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // App loop has shut down
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
