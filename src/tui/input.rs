// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into `UserCommand`s for the app
// orchestrator, or into local `ViewState` mutations (page switching,
// cursors, checkboxes, form editing). Destructive actions are routed
// through the confirmation overlay: the command is only produced after an
// affirmative answer.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::api::types::Season;
use crate::protocol::{Notice, PageId, RollSelection, UserCommand};

use super::{ConfirmAction, FormField, RollMode, SeasonForm, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to
/// the app orchestrator; `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    // Confirmation overlay: y produces the pending command, n/Esc cancels,
    // everything else is blocked.
    if view_state.pending_confirm.is_some() {
        return handle_confirm(key_event, view_state);
    }

    // Season form captures all input while open.
    if view_state.season_form.is_some() {
        return handle_form(key_event, view_state);
    }

    // Inline notes editor inside the detail overlay.
    if view_state.notes_edit.is_some() {
        return handle_notes(key_event, view_state);
    }

    // Detail overlay (history page).
    if view_state.active_page == PageId::History && view_state.roll_details.is_some() {
        return handle_details(key_event, view_state);
    }

    handle_normal(key_event, view_state)
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

fn handle_confirm(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let action = view_state.pending_confirm.take()?;
            Some(match action {
                ConfirmAction::ResetRoster => UserCommand::ResetRoster,
                ConfirmAction::DeleteRoll(id) => UserCommand::DeleteRoll(id),
                ConfirmAction::Quit => UserCommand::Quit,
            })
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.pending_confirm = None;
            None
        }
        _ => None, // Block all other input
    }
}

fn handle_form(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    if key_event.code == KeyCode::Esc {
        view_state.season_form = None;
        return None;
    }

    if key_event.code == KeyCode::Enter {
        let (id, draft, name_empty) = {
            let form = view_state.season_form.as_ref()?;
            (form.id, form.draft(), form.name.trim().is_empty())
        };
        if name_empty {
            view_state.set_notice(Notice::error("Season name is required"));
            return None;
        }
        // The form stays open until the orchestrator reports the save.
        return Some(UserCommand::SaveSeason { id, draft });
    }

    let form = view_state.season_form.as_mut()?;
    match key_event.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Char(' ') if form.focus == FormField::IsActive => {
            form.is_active = !form.is_active;
        }
        KeyCode::Char(c) => match form.focus {
            FormField::Name => form.name.push(c),
            FormField::SpreadsheetTab => form.spreadsheet_tab.push(c),
            FormField::IsActive => {}
        },
        KeyCode::Backspace => match form.focus {
            FormField::Name => {
                form.name.pop();
            }
            FormField::SpreadsheetTab => {
                form.spreadsheet_tab.pop();
            }
            FormField::IsActive => {}
        },
        _ => {}
    }
    None
}

fn handle_notes(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.notes_edit = None;
            None
        }
        KeyCode::Enter => {
            let id = view_state.roll_details.as_ref()?.id;
            let notes = view_state.notes_edit.take()?;
            Some(UserCommand::SaveRollNotes { id, notes })
        }
        KeyCode::Backspace => {
            if let Some(buffer) = view_state.notes_edit.as_mut() {
                buffer.pop();
            }
            None
        }
        KeyCode::Char(c) => {
            if let Some(buffer) = view_state.notes_edit.as_mut() {
                buffer.push(c);
            }
            None
        }
        _ => None,
    }
}

fn handle_details(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let roll_id = view_state.roll_details.as_ref()?.id;
    match key_event.code {
        KeyCode::Esc => {
            view_state.roll_details = None;
            None
        }
        KeyCode::Char('x') => {
            view_state.pending_confirm = Some(ConfirmAction::DeleteRoll(roll_id));
            None
        }
        KeyCode::Char('e') => {
            if view_state.enrich_in_flight {
                None // request already outstanding
            } else {
                Some(UserCommand::EnrichRoll(roll_id))
            }
        }
        KeyCode::Char('o') => {
            let existing = view_state
                .roll_details
                .as_ref()
                .and_then(|r| r.notes.clone())
                .unwrap_or_default();
            view_state.notes_edit = Some(existing);
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        // Page switching (re)loads the page's data
        KeyCode::Char('1') => switch_page(view_state, PageId::Roll),
        KeyCode::Char('2') => switch_page(view_state, PageId::Seasons),
        KeyCode::Char('3') => switch_page(view_state, PageId::History),
        KeyCode::Char('r') => Some(UserCommand::SwitchPage(view_state.active_page)),

        // Quit goes through the confirmation overlay
        KeyCode::Char('q') => {
            view_state.pending_confirm = Some(ConfirmAction::Quit);
            None
        }

        _ => match view_state.active_page {
            PageId::Roll => handle_roll_page(key_event, view_state),
            PageId::Seasons => handle_seasons_page(key_event, view_state),
            PageId::History => handle_history_page(key_event, view_state),
        },
    }
}

fn switch_page(view_state: &mut ViewState, page: PageId) -> Option<UserCommand> {
    view_state.active_page = page;
    Some(UserCommand::SwitchPage(page))
}

fn handle_roll_page(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Down | KeyCode::Char('j') => {
            let max = view_state.eligible.len().saturating_sub(1);
            view_state.participant_cursor = (view_state.participant_cursor + 1).min(max);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.participant_cursor = view_state.participant_cursor.saturating_sub(1);
            None
        }
        KeyCode::Char('m') => {
            view_state.roll_mode = match view_state.roll_mode {
                RollMode::Automatic => RollMode::Custom,
                RollMode::Custom => RollMode::Automatic,
            };
            None
        }
        KeyCode::Char(' ') => {
            if view_state.roll_mode == RollMode::Custom {
                let idx = view_state.participant_cursor;
                if let Some(slot) = view_state.checked.get_mut(idx) {
                    *slot = !*slot;
                }
            }
            None
        }
        KeyCode::Enter => {
            if view_state.roll_in_flight {
                return None; // request already outstanding
            }
            let selection = match view_state.roll_mode {
                RollMode::Automatic => RollSelection::Automatic,
                RollMode::Custom => RollSelection::Custom(checked_names(view_state)),
            };
            Some(UserCommand::PerformRoll { selection })
        }
        KeyCode::Char('e') => {
            if view_state.roll_result.is_some() && !view_state.enrich_in_flight {
                Some(UserCommand::EnrichRollResult)
            } else {
                None
            }
        }
        KeyCode::Char('x') => {
            if view_state.active_season.is_some() {
                view_state.pending_confirm = Some(ConfirmAction::ResetRoster);
            }
            None
        }
        _ => None,
    }
}

fn handle_seasons_page(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Down | KeyCode::Char('j') => {
            let max = view_state.seasons.len().saturating_sub(1);
            view_state.season_cursor = (view_state.season_cursor + 1).min(max);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.season_cursor = view_state.season_cursor.saturating_sub(1);
            None
        }
        KeyCode::Char('n') => {
            view_state.season_form = Some(SeasonForm::new());
            None
        }
        KeyCode::Char('e') => {
            let season = selected_season(view_state)?;
            Some(UserCommand::EditSeason(season.id))
        }
        KeyCode::Char('a') => {
            let season = selected_season(view_state)?;
            // The active season is excluded from the set-active action.
            if season.is_active {
                None
            } else {
                Some(UserCommand::ActivateSeason(season.id))
            }
        }
        _ => None,
    }
}

fn handle_history_page(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Down | KeyCode::Char('j') => {
            let max = view_state.rolls.len().saturating_sub(1);
            view_state.roll_cursor = (view_state.roll_cursor + 1).min(max);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.roll_cursor = view_state.roll_cursor.saturating_sub(1);
            None
        }
        KeyCode::Enter => {
            let roll = view_state.rolls.get(view_state.roll_cursor)?;
            Some(UserCommand::OpenRollDetails(roll.id))
        }
        KeyCode::Char('f') => Some(UserCommand::SetHistoryFilter(next_filter(
            view_state.season_filter,
            &view_state.seasons,
        ))),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Names the user has checked, in eligible-list order.
fn checked_names(view_state: &ViewState) -> Vec<String> {
    view_state
        .eligible
        .iter()
        .zip(view_state.checked.iter())
        .filter(|(_, &checked)| checked)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Cycle the history filter: all seasons -> each season in order -> all.
fn next_filter(current: Option<i64>, seasons: &[Season]) -> Option<i64> {
    if seasons.is_empty() {
        return None;
    }
    match current {
        None => Some(seasons[0].id),
        Some(id) => match seasons.iter().position(|s| s.id == id) {
            Some(i) if i + 1 < seasons.len() => Some(seasons[i + 1].id),
            _ => None, // last season or unknown id -> wrap to all
        },
    }
}

fn selected_season(view_state: &ViewState) -> Option<&Season> {
    view_state.seasons.get(view_state.season_cursor)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
