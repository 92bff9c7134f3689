// TUI: view state, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors what the app orchestrator has
// loaded. The orchestrator pushes `UiUpdate` messages over an mpsc channel;
// the TUI applies them to `ViewState` and re-renders at ~30 fps. User input
// is translated into `UserCommand`s sent the other way.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::api::types::{Roll, RollOutcome, Season, SeasonDraft, TmdbData};
use crate::protocol::{Notice, PageId, UiUpdate, UserCommand};

use layout::build_layout;

/// How long a notice stays in the status bar.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Participant selection mode on the roll page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollMode {
    Automatic,
    Custom,
}

/// Which field of the season form has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    SpreadsheetTab,
    IsActive,
}

/// The season create/edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonForm {
    /// `Some` when editing an existing season.
    pub id: Option<i64>,
    pub name: String,
    pub spreadsheet_tab: String,
    pub is_active: bool,
    pub focus: FormField,
}

impl SeasonForm {
    pub fn new() -> Self {
        SeasonForm {
            id: None,
            name: String::new(),
            spreadsheet_tab: "General".to_string(),
            is_active: false,
            focus: FormField::Name,
        }
    }

    /// Form pre-filled from a fetched season.
    pub fn edit(season: &Season) -> Self {
        SeasonForm {
            id: Some(season.id),
            name: season.name.clone(),
            spreadsheet_tab: season.spreadsheet_tab.clone(),
            is_active: season.is_active,
            focus: FormField::Name,
        }
    }

    pub fn draft(&self) -> SeasonDraft {
        SeasonDraft {
            name: self.name.clone(),
            spreadsheet_tab: self.spreadsheet_tab.clone(),
            is_active: self.is_active,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::SpreadsheetTab,
            FormField::SpreadsheetTab => FormField::IsActive,
            FormField::IsActive => FormField::Name,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::IsActive,
            FormField::SpreadsheetTab => FormField::Name,
            FormField::IsActive => FormField::SpreadsheetTab,
        };
    }
}

impl Default for SeasonForm {
    fn default() -> Self {
        SeasonForm::new()
    }
}

/// A destructive (or final) action awaiting the user's yes/no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    ResetRoster,
    DeleteRoll(i64),
    Quit,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the loaded application data for rendering.
pub struct ViewState {
    pub active_page: PageId,
    /// Current transient notice and when it should disappear.
    pub notice: Option<Notice>,
    pub notice_expiry: Option<Instant>,

    // Season directory (also feeds the history filter options)
    pub seasons: Vec<Season>,
    pub season_cursor: usize,
    pub season_form: Option<SeasonForm>,

    // Roll page
    pub active_season: Option<Season>,
    pub eligible: Vec<String>,
    pub eligible_count: usize,
    /// Checkbox state parallel to `eligible` (custom mode).
    pub checked: Vec<bool>,
    pub participant_cursor: usize,
    pub roll_mode: RollMode,
    /// The roll trigger is disabled while a request is outstanding.
    pub roll_in_flight: bool,
    pub roll_result: Option<RollOutcome>,
    pub movie_details: Option<TmdbData>,
    pub roster: Vec<String>,

    // History page
    pub rolls: Vec<Roll>,
    pub roll_cursor: usize,
    pub season_filter: Option<i64>,
    pub roll_details: Option<Roll>,
    /// Buffer of the inline notes editor, when open.
    pub notes_edit: Option<String>,
    /// Shared by both enrichment triggers; they are never visible at once.
    pub enrich_in_flight: bool,

    pub pending_confirm: Option<ConfirmAction>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            active_page: PageId::Roll,
            notice: None,
            notice_expiry: None,
            seasons: Vec::new(),
            season_cursor: 0,
            season_form: None,
            active_season: None,
            eligible: Vec::new(),
            eligible_count: 0,
            checked: Vec::new(),
            participant_cursor: 0,
            roll_mode: RollMode::Automatic,
            roll_in_flight: false,
            roll_result: None,
            movie_details: None,
            roster: Vec::new(),
            rolls: Vec::new(),
            roll_cursor: 0,
            season_filter: None,
            roll_details: None,
            notes_edit: None,
            enrich_in_flight: false,
            pending_confirm: None,
        }
    }
}

impl ViewState {
    /// Show a transient notice in the status bar.
    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.notice_expiry = Some(Instant::now() + NOTICE_TTL);
    }

    /// Drop the notice once its time is up. Called from the render tick.
    pub fn clear_expired_notice(&mut self, now: Instant) {
        if let Some(expiry) = self.notice_expiry {
            if now >= expiry {
                self.notice = None;
                self.notice_expiry = None;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single `UiUpdate` to the `ViewState`.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Notice(notice) => state.set_notice(notice),

        UiUpdate::ActiveSeason(season) => state.active_season = season,
        UiUpdate::EligibleLoaded(set) => {
            state.eligible = set.eligible;
            state.eligible_count = set.count;
            // A fresh eligible list invalidates old checkbox state.
            state.checked = vec![false; state.eligible.len()];
            state.participant_cursor = state
                .participant_cursor
                .min(state.eligible.len().saturating_sub(1));
        }
        UiUpdate::RosterLoaded(roster) => state.roster = roster,
        UiUpdate::RollStarted => state.roll_in_flight = true,
        UiUpdate::RollCompleted(outcome) => {
            state.roll_result = Some(outcome);
            state.movie_details = None;
        }
        UiUpdate::RollFinished => state.roll_in_flight = false,
        UiUpdate::RollResultCleared => {
            state.roll_result = None;
            state.movie_details = None;
        }
        UiUpdate::EnrichStarted => state.enrich_in_flight = true,
        UiUpdate::MovieDetails(data) => state.movie_details = Some(data),
        UiUpdate::EnrichFinished => state.enrich_in_flight = false,

        UiUpdate::SeasonsLoaded(seasons) => {
            state.seasons = seasons;
            state.season_cursor = state
                .season_cursor
                .min(state.seasons.len().saturating_sub(1));
        }
        UiUpdate::SeasonFormReady(season) => {
            state.season_form = Some(SeasonForm::edit(&season));
        }
        UiUpdate::SeasonSaved => state.season_form = None,

        UiUpdate::HistoryLoaded { rolls, filter } => {
            state.rolls = rolls;
            state.season_filter = filter;
            state.roll_cursor = state.roll_cursor.min(state.rolls.len().saturating_sub(1));
        }
        UiUpdate::RollDetails(roll) => {
            state.roll_details = Some(roll);
            state.notes_edit = None;
        }
        UiUpdate::DetailsClosed => {
            state.roll_details = None;
            state.notes_edit = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Keyboard hints for the help bar, per page.
pub fn help_text(page: PageId) -> &'static str {
    match page {
        PageId::Roll => {
            " 1-3:Pages | j/k:Move | m:Mode | Space:Check | Enter:Roll | e:Enrich | x:Reset roster | r:Refresh | q:Quit"
        }
        PageId::Seasons => {
            " 1-3:Pages | j/k:Move | n:New | e:Edit | a:Set Active | r:Refresh | q:Quit"
        }
        PageId::History => {
            " 1-3:Pages | j/k:Move | Enter:Details | f:Filter | r:Refresh | q:Quit"
        }
    }
}

/// Render the complete frame: status bar, active page, help bar, and any
/// overlay (detail view, season form, confirmation).
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);

    match state.active_page {
        PageId::Roll => widgets::roll_page::render(frame, layout.main, state),
        PageId::Seasons => widgets::seasons_page::render(frame, layout.main, state),
        PageId::History => widgets::history_page::render(frame, layout.main, state),
    }

    let help = Paragraph::new(Line::from(Span::styled(
        help_text(state.active_page),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(help, layout.help_bar);

    if state.active_page == PageId::History {
        if let Some(ref roll) = state.roll_details {
            widgets::roll_details::render(
                frame,
                frame.area(),
                roll,
                state.notes_edit.as_deref(),
                state.enrich_in_flight,
            );
        }
    }

    if let Some(ref form) = state.season_form {
        widgets::season_form::render(frame, frame.area(), form);
    }

    if let Some(ref action) = state.pending_confirm {
        widgets::confirm::render(frame, frame.area(), action);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// Initializes the terminal (failing fast when it is smaller than the
/// dashboard can render), installs a panic hook that restores it, then
/// selects over UI updates, keyboard input, and the render tick until the
/// user quits.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let size = terminal.size()?;
    if !layout::size_is_supported(size.width, size.height) {
        ratatui::restore();
        anyhow::bail!(
            "terminal too small: {}x{} (minimum {}x{})",
            size.width,
            size.height,
            layout::MIN_WIDTH,
            layout::MIN_HEIGHT
        );
    }

    // Restore the terminal on panic before the default hook prints.
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
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => break, // app loop is gone
                }
            }

            // Keyboard input
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
                    Some(Ok(_)) => {
                        // Resize/mouse events: the next render picks them up.
                    }
                    Some(Err(_)) | None => break,
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                view_state.clear_expired_notice(Instant::now());
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
