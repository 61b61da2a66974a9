// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// loop, or into local ViewState changes (tab switching, cursor movement,
// scrolling, the import prompt).

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use matchday_app::protocol::{TabId, UserCommand};

use super::ViewState;

/// Rows moved by PageUp/PageDown.
const PAGE_SIZE: usize = 10;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key should be forwarded to the app
/// loop, `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // crossterm reports releases on some platforms
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    if view_state.import_mode {
        return handle_import_prompt(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Char(c @ '1'..='7') => {
            if let Some(tab) = c.to_digit(10).and_then(TabId::from_number) {
                view_state.active_tab = tab;
            }
            None
        }

        KeyCode::Tab => cycle_participant(view_state, true),
        KeyCode::BackTab => cycle_participant(view_state, false),

        KeyCode::Down | KeyCode::Char('j') => {
            move_cursor(view_state, 1, true);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            move_cursor(view_state, 1, false);
            None
        }
        KeyCode::PageDown => {
            move_cursor(view_state, PAGE_SIZE, true);
            None
        }
        KeyCode::PageUp => {
            move_cursor(view_state, PAGE_SIZE, false);
            None
        }

        KeyCode::Enter | KeyCode::Char(' ') => {
            if view_state.active_tab != TabId::Draft {
                return None;
            }
            view_state
                .selected_club_name()
                .map(|club| UserCommand::ToggleClub(club.to_string()))
        }

        KeyCode::Char('c') => Some(UserCommand::ClearRoster),
        KeyCode::Char('s') => Some(UserCommand::SaveSelection),
        KeyCode::Char('p') => Some(UserCommand::CalculatePoints),
        KeyCode::Char('w') => Some(UserCommand::SimulateWeek),
        KeyCode::Char('r') => Some(UserCommand::ForceRefresh),
        KeyCode::Char('a') => {
            let enabled = view_state.snapshot.as_ref().is_some_and(|s| s.auto_refresh);
            Some(UserCommand::SetAutoRefresh(!enabled))
        }
        KeyCode::Char('e') => Some(UserCommand::Export(None)),
        KeyCode::Char('i') => {
            view_state.import_mode = true;
            view_state.import_path.clear();
            None
        }

        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

/// `y`/`q` confirm, `n`/Esc cancel, everything else is swallowed.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

fn handle_import_prompt(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.import_mode = false;
            view_state.import_path.clear();
            None
        }
        KeyCode::Enter => {
            view_state.import_mode = false;
            let path = std::mem::take(&mut view_state.import_path);
            let path = path.trim();
            if path.is_empty() {
                None
            } else {
                Some(UserCommand::Import(PathBuf::from(path)))
            }
        }
        KeyCode::Backspace => {
            view_state.import_path.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.import_path.push(c);
            None
        }
        _ => None,
    }
}

/// Next or previous drafting participant, wrapping around.
fn cycle_participant(view_state: &ViewState, forward: bool) -> Option<UserCommand> {
    let snapshot = view_state.snapshot.as_ref()?;
    let count = snapshot.participants.len();
    if count == 0 {
        return None;
    }
    let current = snapshot.current_participant.min(count - 1);
    let next = if forward {
        (current + 1) % count
    } else {
        (current + count - 1) % count
    };
    Some(UserCommand::SelectParticipant(next))
}

/// Move the club cursor on the draft tab, scroll everywhere else.
fn move_cursor(view_state: &mut ViewState, rows: usize, down: bool) {
    if view_state.active_tab == TabId::Draft {
        let clubs = view_state.snapshot.as_ref().map_or(0, |s| s.clubs.len());
        let last = clubs.saturating_sub(1);
        view_state.selected_club = if down {
            view_state.selected_club.saturating_add(rows).min(last)
        } else {
            view_state.selected_club.saturating_sub(rows)
        };
        return;
    }

    let offset = view_state
        .scroll_offset
        .entry(scroll_key(view_state.active_tab).to_string())
        .or_insert(0);
    *offset = if down {
        offset.saturating_add(rows)
    } else {
        offset.saturating_sub(rows)
    };
}

/// Key under which a tab's scroll offset is stored.
pub fn scroll_key(tab: TabId) -> &'static str {
    match tab {
        TabId::Leaderboard => "leaderboard",
        TabId::Participants => "participants",
        TabId::Draft => "draft",
        TabId::Live => "live",
        TabId::Upcoming => "upcoming",
        TabId::Standings => "standings",
        TabId::Scorers => "scorers",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
