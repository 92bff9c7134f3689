// Message types exchanged between the app orchestrator and the TUI.
//
// `UserCommand` flows TUI -> app (one per user action); `UiUpdate` flows
// app -> TUI (render data and progress signals). The TUI never calls the
// API itself.

use crate::api::types::{EligibleSet, Roll, RollOutcome, Season, SeasonDraft, TmdbData};

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// The three pages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageId {
    /// Perform a roll for the active season.
    Roll,
    /// Season directory: list, create, edit, activate.
    Seasons,
    /// Roll history: browse, filter, inspect, delete, enrich.
    History,
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// Severity of a user notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient user-facing notification shown in the status line.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Notice {
            text: text.into(),
            level: NoticeLevel::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            text: text.into(),
            level: NoticeLevel::Error,
        }
    }
}

// ---------------------------------------------------------------------------
// Commands (TUI -> app)
// ---------------------------------------------------------------------------

/// How the roll should pick its participant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum RollSelection {
    /// The server picks from all eligible participants.
    Automatic,
    /// The server picks from this user-checked subset.
    Custom(Vec<String>),
}

/// A user action forwarded to the app orchestrator.
///
/// Destructive commands (`ResetRoster`, `DeleteRoll`) are only emitted by
/// the input layer after the confirmation overlay was answered
/// affirmatively.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Switch to a page and (re)load its data.
    SwitchPage(PageId),
    PerformRoll { selection: RollSelection },
    ResetRoster,
    /// Enrich the roll shown in the roll-result block.
    EnrichRollResult,
    SaveSeason {
        id: Option<i64>,
        draft: SeasonDraft,
    },
    EditSeason(i64),
    ActivateSeason(i64),
    SetHistoryFilter(Option<i64>),
    OpenRollDetails(i64),
    DeleteRoll(i64),
    /// Enrich a roll from the history detail overlay.
    EnrichRoll(i64),
    SaveRollNotes { id: i64, notes: String },
    Quit,
}

// ---------------------------------------------------------------------------
// Updates (app -> TUI)
// ---------------------------------------------------------------------------

/// A render update pushed to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Notice(Notice),

    // Roll page
    ActiveSeason(Option<Season>),
    EligibleLoaded(EligibleSet),
    RosterLoaded(Vec<String>),
    /// A roll request went out; the trigger is disabled until
    /// `RollFinished` arrives.
    RollStarted,
    RollCompleted(RollOutcome),
    /// Sent after every roll attempt, success or failure, so the trigger
    /// is always re-enabled.
    RollFinished,
    /// The roster was reset; any displayed roll result is stale.
    RollResultCleared,
    /// An enrichment request went out; the trigger is disabled and
    /// relabelled until `EnrichFinished` arrives.
    EnrichStarted,
    MovieDetails(TmdbData),
    /// Sent after every enrichment attempt, success or failure.
    EnrichFinished,

    // Seasons page
    SeasonsLoaded(Vec<Season>),
    /// A season was fetched for editing; the TUI opens the form with it.
    SeasonFormReady(Season),
    /// Create/update succeeded; the TUI closes the form.
    SeasonSaved,

    // History page
    HistoryLoaded {
        rolls: Vec<Roll>,
        filter: Option<i64>,
    },
    RollDetails(Roll),
    DetailsClosed,
}
