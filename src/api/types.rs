// Wire types for the movie night REST API.
//
// Every entity here is a read-only projection of a server-owned record.
// The client never invents state: it deserializes what the server returns
// and re-fetches after each mutation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Server entities
// ---------------------------------------------------------------------------

/// A movie night season. At most one season is active at a time; the server
/// enforces that invariant when a season is created or activated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Season {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub spreadsheet_tab: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A completed roll: one participant, one movie. `tmdb_data` is present only
/// after the roll has been enriched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Roll {
    pub id: i64,
    #[serde(default)]
    pub season_id: Option<i64>,
    pub movie_title: String,
    pub participant_name: String,
    #[serde(default)]
    pub roll_date: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tmdb_id: Option<i64>,
    #[serde(default)]
    pub tmdb_data: Option<TmdbData>,
}

/// Movie metadata looked up server-side from the movie database.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmdbData {
    #[serde(default)]
    pub tmdb_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Response of `GET /api/eligible`: participants who have not yet been
/// rolled for the active season. Computed server-side; the client only
/// displays it.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EligibleSet {
    #[serde(default)]
    pub eligible: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

/// Response of `GET /api/seasons/{id}/roster`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterResponse {
    #[serde(default)]
    pub roster: Vec<String>,
}

/// Result of `POST /api/rolls`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RollOutcome {
    #[serde(default)]
    pub success: bool,
    pub participant: String,
    pub movie: String,
    pub roll_id: i64,
    #[serde(default)]
    pub eligible_count: usize,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body for creating a season (the season form).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonDraft {
    pub name: String,
    pub spreadsheet_tab: String,
    pub is_active: bool,
}

/// Partial season update. Fields left as `None` are omitted from the JSON
/// body so the server only touches what the client sent.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SeasonPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_tab: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl SeasonPatch {
    /// Patch that activates a season. The server deactivates every other
    /// season as part of the same update.
    pub fn activate() -> Self {
        SeasonPatch {
            is_active: Some(true),
            ..SeasonPatch::default()
        }
    }

    /// Full-field patch from a submitted season form.
    pub fn from_draft(draft: &SeasonDraft) -> Self {
        SeasonPatch {
            name: Some(draft.name.clone()),
            spreadsheet_tab: Some(draft.spreadsheet_tab.clone()),
            is_active: Some(draft.is_active),
        }
    }
}

/// Body for `POST /api/rolls`. `participants` is `null` in automatic mode;
/// the server then picks from all eligible participants. A `null` season id
/// makes the server fall back to the active season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollRequest {
    pub season_id: Option<i64>,
    pub participants: Option<Vec<String>>,
}

/// Partial roll update (notes editing).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RollPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
