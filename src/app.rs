// Application state and orchestration logic.
//
// The command loop that drives the three pages. The TUI sends one
// `UserCommand` per user action; each handler runs to completion (API call,
// follow-up re-fetches, UI updates) before the next command is taken, so
// steps within a handler execute strictly in written order. Any API failure
// is converted into a user notice; nothing is retried or rolled back.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::types::{RollPatch, RollRequest, SeasonDraft, SeasonPatch};
use crate::api::MovieNightApi;
use crate::protocol::{Notice, PageId, RollSelection, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The orchestrator's owned state: the API handle plus the per-page
/// transient fields the original page scripts kept as globals.
pub struct AppState {
    pub api: Arc<dyn MovieNightApi>,
    /// Last fetched active season (roll page).
    pub current_season: Option<crate::api::types::Season>,
    /// Roll targeted by the result block or the open detail overlay.
    pub current_roll_id: Option<i64>,
    /// Season targeted by the open edit form, if any.
    pub editing_season_id: Option<i64>,
    /// Active season filter on the history page.
    pub season_filter: Option<i64>,
}

impl AppState {
    pub fn new(api: Arc<dyn MovieNightApi>) -> Self {
        AppState {
            api,
            current_season: None,
            current_roll_id: None,
            editing_season_id: None,
            season_filter: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Command loop
// ---------------------------------------------------------------------------

/// Run the application command loop.
///
/// Loads the roll page up front (the default page), then processes commands
/// until `Quit` arrives or the TUI drops its sender.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application command loop started");

    load_page(&mut state, PageId::Roll, &ui_tx).await;

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            UserCommand::Quit => {
                info!("Quit command received, shutting down");
                break;
            }
            other => handle_command(&mut state, other, &ui_tx).await,
        }
    }

    info!("Application command loop exiting");
    Ok(())
}

/// Dispatch a single user command to its handler.
pub async fn handle_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::SwitchPage(page) => load_page(state, page, ui_tx).await,
        UserCommand::PerformRoll { selection } => perform_roll(state, selection, ui_tx).await,
        UserCommand::ResetRoster => reset_roster(state, ui_tx).await,
        UserCommand::EnrichRollResult => enrich_roll_result(state, ui_tx).await,
        UserCommand::SaveSeason { id, draft } => save_season(state, id, draft, ui_tx).await,
        UserCommand::EditSeason(id) => edit_season(state, id, ui_tx).await,
        UserCommand::ActivateSeason(id) => activate_season(state, id, ui_tx).await,
        UserCommand::SetHistoryFilter(filter) => {
            state.season_filter = filter;
            load_history(state, ui_tx).await;
        }
        UserCommand::OpenRollDetails(id) => open_roll_details(state, id, ui_tx).await,
        UserCommand::DeleteRoll(id) => delete_roll(state, id, ui_tx).await,
        UserCommand::EnrichRoll(id) => enrich_history_roll(state, id, ui_tx).await,
        UserCommand::SaveRollNotes { id, notes } => save_roll_notes(state, id, notes, ui_tx).await,
        UserCommand::Quit => {}
    }
}

// ---------------------------------------------------------------------------
// Page loading
// ---------------------------------------------------------------------------

/// Load the data a page needs on entry, mirroring the original pages'
/// load-on-open sequence.
pub async fn load_page(state: &mut AppState, page: PageId, ui_tx: &mpsc::Sender<UiUpdate>) {
    match page {
        PageId::Roll => {
            load_active_season(state, ui_tx).await;
            load_eligible(state, ui_tx).await;
            load_roster(state, ui_tx).await;
        }
        PageId::Seasons => {
            load_seasons(state, ui_tx).await;
        }
        PageId::History => {
            // The season list feeds the filter options.
            load_seasons(state, ui_tx).await;
            load_history(state, ui_tx).await;
        }
    }
}

async fn load_active_season(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let api = Arc::clone(&state.api);
    match api.list_seasons().await {
        Ok(seasons) => {
            state.current_season = seasons.into_iter().find(|s| s.is_active);
            send(ui_tx, UiUpdate::ActiveSeason(state.current_season.clone())).await;
        }
        Err(e) => notify(ui_tx, Notice::error(format!("Error loading season: {e}"))).await,
    }
}

async fn load_eligible(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let api = Arc::clone(&state.api);
    match api.eligible().await {
        Ok(set) => send(ui_tx, UiUpdate::EligibleLoaded(set)).await,
        Err(e) => notify(ui_tx, Notice::error(format!("Error loading participants: {e}"))).await,
    }
}

async fn load_roster(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let Some(season_id) = state.current_season.as_ref().map(|s| s.id) else {
        return;
    };
    let api = Arc::clone(&state.api);
    match api.season_roster(season_id).await {
        Ok(roster) => send(ui_tx, UiUpdate::RosterLoaded(roster)).await,
        Err(e) => notify(ui_tx, Notice::error(format!("Error loading roster: {e}"))).await,
    }
}

async fn load_seasons(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let api = Arc::clone(&state.api);
    match api.list_seasons().await {
        Ok(seasons) => send(ui_tx, UiUpdate::SeasonsLoaded(seasons)).await,
        Err(e) => notify(ui_tx, Notice::error(format!("Error loading seasons: {e}"))).await,
    }
}

async fn load_history(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let api = Arc::clone(&state.api);
    let filter = state.season_filter;
    match api.list_rolls(filter).await {
        Ok(rolls) => send(ui_tx, UiUpdate::HistoryLoaded { rolls, filter }).await,
        Err(e) => notify(ui_tx, Notice::error(format!("Error loading history: {e}"))).await,
    }
}

// ---------------------------------------------------------------------------
// Roll page handlers
// ---------------------------------------------------------------------------

/// Perform a roll.
///
/// Custom mode with nothing checked is rejected locally: no request goes
/// out and a validation notice is shown. Otherwise the trigger is disabled
/// (`RollStarted`), the request is sent, and on success the returned roll
/// id is captured and eligibility and roster are re-fetched, since the rolled
/// participant just became ineligible. `RollFinished` is sent on every
/// path so the trigger always comes back.
async fn perform_roll(
    state: &mut AppState,
    selection: RollSelection,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let participants = match selection {
        RollSelection::Automatic => None,
        RollSelection::Custom(names) => {
            if names.is_empty() {
                notify(ui_tx, Notice::error("Please select at least one participant")).await;
                return;
            }
            Some(names)
        }
    };

    send(ui_tx, UiUpdate::RollStarted).await;

    let req = RollRequest {
        season_id: state.current_season.as_ref().map(|s| s.id),
        participants,
    };
    let api = Arc::clone(&state.api);
    match api.perform_roll(&req).await {
        Ok(outcome) => {
            info!(
                "Roll complete: {} -> \"{}\" (roll id {})",
                outcome.participant, outcome.movie, outcome.roll_id
            );
            state.current_roll_id = Some(outcome.roll_id);
            send(ui_tx, UiUpdate::RollCompleted(outcome)).await;
            load_eligible(state, ui_tx).await;
            load_roster(state, ui_tx).await;
            notify(ui_tx, Notice::success("Roll successful!")).await;
        }
        Err(e) => {
            warn!("Roll failed: {}", e);
            notify(ui_tx, Notice::error(format!("Error performing roll: {e}"))).await;
        }
    }

    send(ui_tx, UiUpdate::RollFinished).await;
}

/// Reset the active season's roster (all its rolls). The confirmation
/// already happened in the TUI.
async fn reset_roster(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let Some(season_id) = state.current_season.as_ref().map(|s| s.id) else {
        return;
    };
    let api = Arc::clone(&state.api);
    match api.reset_roster(season_id).await {
        Ok(()) => {
            state.current_roll_id = None;
            load_eligible(state, ui_tx).await;
            load_roster(state, ui_tx).await;
            send(ui_tx, UiUpdate::RollResultCleared).await;
            notify(ui_tx, Notice::success("Season roster reset successfully!")).await;
        }
        Err(e) => notify(ui_tx, Notice::error(format!("Error resetting roster: {e}"))).await,
    }
}

/// Enrich the roll shown in the result block. `EnrichFinished` is sent on
/// every path so the trigger and its label always come back.
async fn enrich_roll_result(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let Some(roll_id) = state.current_roll_id else {
        return;
    };

    send(ui_tx, UiUpdate::EnrichStarted).await;

    let api = Arc::clone(&state.api);
    match api.enrich_roll(roll_id).await {
        Ok(roll) => {
            if let Some(data) = roll.tmdb_data {
                send(ui_tx, UiUpdate::MovieDetails(data)).await;
                notify(ui_tx, Notice::success("Movie details fetched successfully!")).await;
            }
        }
        Err(e) => {
            notify(ui_tx, Notice::error(format!("Error fetching movie details: {e}"))).await
        }
    }

    send(ui_tx, UiUpdate::EnrichFinished).await;
}

// ---------------------------------------------------------------------------
// Seasons page handlers
// ---------------------------------------------------------------------------

/// Create or update a season from the submitted form. On success the form
/// closes and the list is re-fetched; on failure the form stays open.
async fn save_season(
    state: &mut AppState,
    id: Option<i64>,
    draft: SeasonDraft,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let api = Arc::clone(&state.api);
    let result = match id {
        Some(season_id) => api
            .update_season(season_id, &SeasonPatch::from_draft(&draft))
            .await
            .map(|_| "Season updated successfully!"),
        None => api
            .create_season(&draft)
            .await
            .map(|_| "Season created successfully!"),
    };

    match result {
        Ok(message) => {
            state.editing_season_id = None;
            send(ui_tx, UiUpdate::SeasonSaved).await;
            notify(ui_tx, Notice::success(message)).await;
            load_seasons(state, ui_tx).await;
        }
        Err(e) => notify(ui_tx, Notice::error(format!("Error saving season: {e}"))).await,
    }
}

/// Fetch a season and hand it to the TUI so the edit form opens populated.
async fn edit_season(state: &mut AppState, id: i64, ui_tx: &mpsc::Sender<UiUpdate>) {
    let api = Arc::clone(&state.api);
    match api.get_season(id).await {
        Ok(season) => {
            state.editing_season_id = Some(id);
            send(ui_tx, UiUpdate::SeasonFormReady(season)).await;
        }
        Err(e) => notify(ui_tx, Notice::error(format!("Error loading season: {e}"))).await,
    }
}

/// Activate a season. The server deactivates every other season as part of
/// the same update (at most one active season, enforced server-side).
async fn activate_season(state: &mut AppState, id: i64, ui_tx: &mpsc::Sender<UiUpdate>) {
    let api = Arc::clone(&state.api);
    match api.update_season(id, &SeasonPatch::activate()).await {
        Ok(_) => {
            notify(ui_tx, Notice::success("Season activated successfully!")).await;
            load_seasons(state, ui_tx).await;
        }
        Err(e) => notify(ui_tx, Notice::error(format!("Error activating season: {e}"))).await,
    }
}

// ---------------------------------------------------------------------------
// History page handlers
// ---------------------------------------------------------------------------

async fn open_roll_details(state: &mut AppState, id: i64, ui_tx: &mpsc::Sender<UiUpdate>) {
    let api = Arc::clone(&state.api);
    match api.get_roll(id).await {
        Ok(roll) => {
            state.current_roll_id = Some(id);
            send(ui_tx, UiUpdate::RollDetails(roll)).await;
        }
        Err(e) => notify(ui_tx, Notice::error(format!("Error loading roll details: {e}"))).await,
    }
}

/// Delete a roll, close the overlay, and reload the filtered list so it
/// stays consistent with the just-deleted record.
async fn delete_roll(state: &mut AppState, id: i64, ui_tx: &mpsc::Sender<UiUpdate>) {
    let api = Arc::clone(&state.api);
    match api.delete_roll(id).await {
        Ok(()) => {
            state.current_roll_id = None;
            send(ui_tx, UiUpdate::DetailsClosed).await;
            load_history(state, ui_tx).await;
            notify(ui_tx, Notice::success("Roll deleted successfully!")).await;
        }
        Err(e) => notify(ui_tx, Notice::error(format!("Error deleting roll: {e}"))).await,
    }
}

/// Enrich a roll from the detail overlay, then re-fetch the details and
/// reload the filtered list so its enrichment indicator updates.
async fn enrich_history_roll(state: &mut AppState, id: i64, ui_tx: &mpsc::Sender<UiUpdate>) {
    send(ui_tx, UiUpdate::EnrichStarted).await;

    let api = Arc::clone(&state.api);
    match api.enrich_roll(id).await {
        Ok(_) => {
            match api.get_roll(id).await {
                Ok(roll) => send(ui_tx, UiUpdate::RollDetails(roll)).await,
                Err(e) => {
                    notify(ui_tx, Notice::error(format!("Error loading roll details: {e}"))).await
                }
            }
            load_history(state, ui_tx).await;
            notify(ui_tx, Notice::success("Movie details fetched successfully!")).await;
        }
        Err(e) => {
            notify(ui_tx, Notice::error(format!("Error fetching movie details: {e}"))).await
        }
    }

    send(ui_tx, UiUpdate::EnrichFinished).await;
}

async fn save_roll_notes(
    state: &mut AppState,
    id: i64,
    notes: String,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let api = Arc::clone(&state.api);
    let patch = RollPatch { notes: Some(notes) };
    match api.update_roll(id, &patch).await {
        Ok(roll) => {
            send(ui_tx, UiUpdate::RollDetails(roll)).await;
            notify(ui_tx, Notice::success("Notes updated successfully!")).await;
        }
        Err(e) => notify(ui_tx, Notice::error(format!("Error saving notes: {e}"))).await,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn send(ui_tx: &mpsc::Sender<UiUpdate>, update: UiUpdate) {
    let _ = ui_tx.send(update).await;
}

async fn notify(ui_tx: &mpsc::Sender<UiUpdate>, notice: Notice) {
    send(ui_tx, UiUpdate::Notice(notice)).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{
        EligibleSet, Roll, RollOutcome, Season, TmdbData,
    };
    use crate::api::ApiError;
    use crate::protocol::NoticeLevel;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Recording fake API
    // -----------------------------------------------------------------------

    /// Records every call (method + path + body where relevant) and serves
    /// scripted responses. A single operation can be scripted to fail.
    struct FakeApi {
        calls: Mutex<Vec<String>>,
        seasons: Vec<Season>,
        eligible: EligibleSet,
        roster: Vec<String>,
        rolls: Vec<Roll>,
        roll: Option<Roll>,
        outcome: Option<RollOutcome>,
        fail: Option<&'static str>,
    }

    impl FakeApi {
        fn new() -> Self {
            FakeApi {
                calls: Mutex::new(Vec::new()),
                seasons: Vec::new(),
                eligible: EligibleSet::default(),
                roster: Vec::new(),
                rolls: Vec::new(),
                roll: None,
                outcome: None,
                fail: None,
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn check(&self, op: &'static str) -> Result<(), ApiError> {
            if self.fail == Some(op) {
                Err(ApiError::Api {
                    status: 500,
                    message: format!("{op} failed"),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl MovieNightApi for FakeApi {
        async fn list_seasons(&self) -> Result<Vec<Season>, ApiError> {
            self.record("GET /api/seasons");
            self.check("list_seasons")?;
            Ok(self.seasons.clone())
        }

        async fn get_season(&self, id: i64) -> Result<Season, ApiError> {
            self.record(format!("GET /api/seasons/{id}"));
            self.check("get_season")?;
            self.seasons
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or(ApiError::Api {
                    status: 404,
                    message: "Not found".into(),
                })
        }

        async fn create_season(
            &self,
            draft: &crate::api::types::SeasonDraft,
        ) -> Result<Season, ApiError> {
            self.record(format!(
                "POST /api/seasons {}",
                serde_json::to_string(draft).unwrap()
            ));
            self.check("create_season")?;
            Ok(season(99, &draft.name, draft.is_active))
        }

        async fn update_season(&self, id: i64, patch: &SeasonPatch) -> Result<Season, ApiError> {
            self.record(format!(
                "PUT /api/seasons/{id} {}",
                serde_json::to_string(patch).unwrap()
            ));
            self.check("update_season")?;
            Ok(season(id, "updated", patch.is_active.unwrap_or(false)))
        }

        async fn season_roster(&self, id: i64) -> Result<Vec<String>, ApiError> {
            self.record(format!("GET /api/seasons/{id}/roster"));
            self.check("season_roster")?;
            Ok(self.roster.clone())
        }

        async fn reset_roster(&self, id: i64) -> Result<(), ApiError> {
            self.record(format!("DELETE /api/seasons/{id}/roster"));
            self.check("reset_roster")
        }

        async fn eligible(&self) -> Result<EligibleSet, ApiError> {
            self.record("GET /api/eligible");
            self.check("eligible")?;
            Ok(self.eligible.clone())
        }

        async fn list_rolls(&self, season_id: Option<i64>) -> Result<Vec<Roll>, ApiError> {
            match season_id {
                Some(id) => self.record(format!("GET /api/rolls?season_id={id}")),
                None => self.record("GET /api/rolls"),
            }
            self.check("list_rolls")?;
            Ok(self.rolls.clone())
        }

        async fn get_roll(&self, id: i64) -> Result<Roll, ApiError> {
            self.record(format!("GET /api/rolls/{id}"));
            self.check("get_roll")?;
            Ok(self.roll.clone().expect("roll not scripted"))
        }

        async fn perform_roll(&self, req: &RollRequest) -> Result<RollOutcome, ApiError> {
            self.record(format!(
                "POST /api/rolls {}",
                serde_json::to_string(req).unwrap()
            ));
            self.check("perform_roll")?;
            Ok(self.outcome.clone().expect("outcome not scripted"))
        }

        async fn update_roll(&self, id: i64, patch: &RollPatch) -> Result<Roll, ApiError> {
            self.record(format!(
                "PUT /api/rolls/{id} {}",
                serde_json::to_string(patch).unwrap()
            ));
            self.check("update_roll")?;
            Ok(self.roll.clone().expect("roll not scripted"))
        }

        async fn delete_roll(&self, id: i64) -> Result<(), ApiError> {
            self.record(format!("DELETE /api/rolls/{id}"));
            self.check("delete_roll")
        }

        async fn enrich_roll(&self, id: i64) -> Result<Roll, ApiError> {
            self.record(format!("POST /api/rolls/{id}/enrich"));
            self.check("enrich_roll")?;
            Ok(self.roll.clone().expect("roll not scripted"))
        }
    }

    // -----------------------------------------------------------------------
    // Fixtures
    // -----------------------------------------------------------------------

    fn season(id: i64, name: &str, is_active: bool) -> Season {
        Season {
            id,
            name: name.into(),
            spreadsheet_tab: "General".into(),
            is_active,
            start_date: None,
            end_date: None,
            created_at: Some("2024-01-05T19:12:03".into()),
        }
    }

    fn roll_fixture(id: i64, tmdb: bool) -> Roll {
        Roll {
            id,
            season_id: Some(3),
            movie_title: "The Thing".into(),
            participant_name: "Alice".into(),
            roll_date: "2024-02-10T20:00:00".into(),
            notes: None,
            tmdb_id: tmdb.then_some(905),
            tmdb_data: tmdb.then(|| TmdbData {
                tmdb_id: Some(905),
                title: "The Thing".into(),
                overview: Some("Antarctic horror.".into()),
                release_date: Some("1982-06-25".into()),
                poster_url: None,
                backdrop_url: None,
                vote_average: Some(8.1),
                runtime: Some(109),
                genres: vec!["Horror".into()],
            }),
        }
    }

    fn outcome_fixture() -> RollOutcome {
        RollOutcome {
            success: true,
            participant: "Bob".into(),
            movie: "Alien".into(),
            roll_id: 17,
            eligible_count: 4,
        }
    }

    fn setup(api: FakeApi) -> (Arc<FakeApi>, AppState, mpsc::Sender<UiUpdate>, mpsc::Receiver<UiUpdate>) {
        let api = Arc::new(api);
        let state = AppState::new(Arc::clone(&api) as Arc<dyn MovieNightApi>);
        let (ui_tx, ui_rx) = mpsc::channel(64);
        (api, state, ui_tx, ui_rx)
    }

    fn drain(rx: &mut mpsc::Receiver<UiUpdate>) -> Vec<UiUpdate> {
        let mut updates = Vec::new();
        while let Ok(u) = rx.try_recv() {
            updates.push(u);
        }
        updates
    }

    fn error_notices(updates: &[UiUpdate]) -> Vec<String> {
        updates
            .iter()
            .filter_map(|u| match u {
                UiUpdate::Notice(n) if n.level == NoticeLevel::Error => Some(n.text.clone()),
                _ => None,
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Roll page
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn custom_roll_with_no_participants_calls_no_api() {
        let (api, mut state, ui_tx, mut ui_rx) = setup(FakeApi::new());
        state.current_season = Some(season(3, "Winter", true));

        perform_roll(&mut state, RollSelection::Custom(vec![]), &ui_tx).await;

        assert!(api.calls().is_empty(), "validation failure must not hit the API");
        let updates = drain(&mut ui_rx);
        assert_eq!(
            error_notices(&updates),
            vec!["Please select at least one participant"]
        );
        assert!(
            !updates.contains(&UiUpdate::RollStarted),
            "rejected roll should never disable the trigger"
        );
    }

    #[tokio::test]
    async fn custom_roll_submits_selected_participants() {
        let mut fake = FakeApi::new();
        fake.outcome = Some(outcome_fixture());
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);
        state.current_season = Some(season(3, "Winter", true));

        perform_roll(
            &mut state,
            RollSelection::Custom(vec!["Alice".into(), "Bob".into()]),
            &ui_tx,
        )
        .await;

        let calls = api.calls();
        assert_eq!(
            calls[0],
            r#"POST /api/rolls {"season_id":3,"participants":["Alice","Bob"]}"#
        );
        drain(&mut ui_rx);
    }

    #[tokio::test]
    async fn automatic_roll_submits_null_participants() {
        let mut fake = FakeApi::new();
        fake.outcome = Some(outcome_fixture());
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);
        state.current_season = Some(season(3, "Winter", true));

        perform_roll(&mut state, RollSelection::Automatic, &ui_tx).await;

        assert_eq!(
            api.calls()[0],
            r#"POST /api/rolls {"season_id":3,"participants":null}"#
        );
        drain(&mut ui_rx);
    }

    #[tokio::test]
    async fn successful_roll_refetches_eligibility_and_roster() {
        let mut fake = FakeApi::new();
        fake.outcome = Some(outcome_fixture());
        fake.eligible = EligibleSet {
            eligible: vec!["Carol".into()],
            count: 1,
        };
        fake.roster = vec!["Alice".into(), "Bob".into()];
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);
        state.current_season = Some(season(3, "Winter", true));

        perform_roll(&mut state, RollSelection::Automatic, &ui_tx).await;

        let calls = api.calls();
        assert_eq!(calls.len(), 3, "roll plus exactly two follow-up fetches");
        assert!(calls[0].starts_with("POST /api/rolls"));
        assert_eq!(calls[1], "GET /api/eligible");
        assert_eq!(calls[2], "GET /api/seasons/3/roster");

        assert_eq!(state.current_roll_id, Some(17));

        let updates = drain(&mut ui_rx);
        assert!(updates.contains(&UiUpdate::RollCompleted(outcome_fixture())));
        assert_eq!(updates.last(), Some(&UiUpdate::RollFinished));
    }

    #[tokio::test]
    async fn failed_roll_still_reenables_trigger() {
        let mut fake = FakeApi::new();
        fake.fail = Some("perform_roll");
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);
        state.current_season = Some(season(3, "Winter", true));

        perform_roll(&mut state, RollSelection::Automatic, &ui_tx).await;

        assert_eq!(api.calls().len(), 1, "no follow-up fetches after a failure");
        let updates = drain(&mut ui_rx);
        assert_eq!(updates.first(), Some(&UiUpdate::RollStarted));
        assert_eq!(updates.last(), Some(&UiUpdate::RollFinished));
        assert_eq!(
            error_notices(&updates),
            vec!["Error performing roll: perform_roll failed"]
        );
        assert!(state.current_roll_id.is_none());
    }

    #[tokio::test]
    async fn reset_roster_reloads_and_clears_result() {
        let mut fake = FakeApi::new();
        fake.roster = vec![];
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);
        state.current_season = Some(season(3, "Winter", true));
        state.current_roll_id = Some(17);

        reset_roster(&mut state, &ui_tx).await;

        let calls = api.calls();
        assert_eq!(calls[0], "DELETE /api/seasons/3/roster");
        assert_eq!(calls[1], "GET /api/eligible");
        assert_eq!(calls[2], "GET /api/seasons/3/roster");

        let updates = drain(&mut ui_rx);
        assert!(updates.contains(&UiUpdate::RollResultCleared));
        assert!(state.current_roll_id.is_none());
    }

    #[tokio::test]
    async fn reset_roster_without_active_season_is_noop() {
        let (api, mut state, ui_tx, mut ui_rx) = setup(FakeApi::new());

        reset_roster(&mut state, &ui_tx).await;

        assert!(api.calls().is_empty());
        assert!(drain(&mut ui_rx).is_empty());
    }

    #[tokio::test]
    async fn enrich_result_renders_details_on_success() {
        let mut fake = FakeApi::new();
        fake.roll = Some(roll_fixture(17, true));
        let (_, mut state, ui_tx, mut ui_rx) = setup(fake);
        state.current_roll_id = Some(17);

        enrich_roll_result(&mut state, &ui_tx).await;

        let updates = drain(&mut ui_rx);
        assert_eq!(updates.first(), Some(&UiUpdate::EnrichStarted));
        assert_eq!(updates.last(), Some(&UiUpdate::EnrichFinished));
        assert!(updates
            .iter()
            .any(|u| matches!(u, UiUpdate::MovieDetails(d) if d.title == "The Thing")));
    }

    #[tokio::test]
    async fn enrich_result_restores_trigger_after_failure() {
        let mut fake = FakeApi::new();
        fake.fail = Some("enrich_roll");
        let (_, mut state, ui_tx, mut ui_rx) = setup(fake);
        state.current_roll_id = Some(17);

        enrich_roll_result(&mut state, &ui_tx).await;

        let updates = drain(&mut ui_rx);
        assert_eq!(updates.first(), Some(&UiUpdate::EnrichStarted));
        assert_eq!(updates.last(), Some(&UiUpdate::EnrichFinished));
        assert_eq!(
            error_notices(&updates),
            vec!["Error fetching movie details: enrich_roll failed"]
        );
    }

    #[tokio::test]
    async fn enrich_result_without_roll_is_noop() {
        let (api, mut state, ui_tx, mut ui_rx) = setup(FakeApi::new());

        enrich_roll_result(&mut state, &ui_tx).await;

        assert!(api.calls().is_empty());
        assert!(drain(&mut ui_rx).is_empty());
    }

    // -----------------------------------------------------------------------
    // Page loading
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn roll_page_load_picks_active_season() {
        let mut fake = FakeApi::new();
        fake.seasons = vec![season(1, "Fall", false), season(3, "Winter", true)];
        fake.eligible = EligibleSet {
            eligible: vec!["Alice".into(), "Bob".into()],
            count: 2,
        };
        fake.roster = vec!["Carol".into()];
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);

        load_page(&mut state, PageId::Roll, &ui_tx).await;

        assert_eq!(state.current_season.as_ref().map(|s| s.id), Some(3));
        let calls = api.calls();
        assert_eq!(
            calls,
            vec![
                "GET /api/seasons",
                "GET /api/eligible",
                "GET /api/seasons/3/roster"
            ]
        );
        let updates = drain(&mut ui_rx);
        assert!(updates
            .iter()
            .any(|u| matches!(u, UiUpdate::ActiveSeason(Some(s)) if s.id == 3)));
        assert!(updates.contains(&UiUpdate::RosterLoaded(vec!["Carol".into()])));
    }

    #[tokio::test]
    async fn roll_page_load_without_active_season_skips_roster() {
        let mut fake = FakeApi::new();
        fake.seasons = vec![season(1, "Fall", false)];
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);

        load_page(&mut state, PageId::Roll, &ui_tx).await;

        assert!(state.current_season.is_none());
        assert_eq!(api.calls(), vec!["GET /api/seasons", "GET /api/eligible"]);
        let updates = drain(&mut ui_rx);
        assert!(updates.contains(&UiUpdate::ActiveSeason(None)));
    }

    #[tokio::test]
    async fn history_page_load_fetches_seasons_and_rolls() {
        let mut fake = FakeApi::new();
        fake.seasons = vec![season(3, "Winter", true)];
        fake.rolls = vec![roll_fixture(12, false)];
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);

        load_page(&mut state, PageId::History, &ui_tx).await;

        assert_eq!(api.calls(), vec!["GET /api/seasons", "GET /api/rolls"]);
        let updates = drain(&mut ui_rx);
        assert!(updates.iter().any(|u| matches!(
            u,
            UiUpdate::HistoryLoaded { rolls, filter: None } if rolls.len() == 1
        )));
    }

    // -----------------------------------------------------------------------
    // Seasons page
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn save_season_create_posts_draft_and_reloads() {
        let (api, mut state, ui_tx, mut ui_rx) = setup(FakeApi::new());
        let draft = SeasonDraft {
            name: "Spring".into(),
            spreadsheet_tab: "Spring".into(),
            is_active: true,
        };

        save_season(&mut state, None, draft, &ui_tx).await;

        let calls = api.calls();
        assert_eq!(
            calls[0],
            r#"POST /api/seasons {"name":"Spring","spreadsheet_tab":"Spring","is_active":true}"#
        );
        assert_eq!(calls[1], "GET /api/seasons");
        let updates = drain(&mut ui_rx);
        assert!(updates.contains(&UiUpdate::SeasonSaved));
    }

    #[tokio::test]
    async fn save_season_update_puts_full_patch() {
        let (api, mut state, ui_tx, mut ui_rx) = setup(FakeApi::new());
        state.editing_season_id = Some(2);
        let draft = SeasonDraft {
            name: "Fall".into(),
            spreadsheet_tab: "Fall".into(),
            is_active: false,
        };

        save_season(&mut state, Some(2), draft, &ui_tx).await;

        assert_eq!(
            api.calls()[0],
            r#"PUT /api/seasons/2 {"name":"Fall","spreadsheet_tab":"Fall","is_active":false}"#
        );
        assert!(state.editing_season_id.is_none());
        drain(&mut ui_rx);
    }

    #[tokio::test]
    async fn save_season_failure_keeps_form_open() {
        let mut fake = FakeApi::new();
        fake.fail = Some("create_season");
        let (_, mut state, ui_tx, mut ui_rx) = setup(fake);
        let draft = SeasonDraft {
            name: "Spring".into(),
            spreadsheet_tab: "Spring".into(),
            is_active: false,
        };

        save_season(&mut state, None, draft, &ui_tx).await;

        let updates = drain(&mut ui_rx);
        assert!(
            !updates.contains(&UiUpdate::SeasonSaved),
            "a failed save must not close the form"
        );
        assert_eq!(
            error_notices(&updates),
            vec!["Error saving season: create_season failed"]
        );
    }

    #[tokio::test]
    async fn activate_season_sends_activation_patch() {
        let (api, mut state, ui_tx, mut ui_rx) = setup(FakeApi::new());

        activate_season(&mut state, 2, &ui_tx).await;

        let calls = api.calls();
        assert_eq!(calls[0], r#"PUT /api/seasons/2 {"is_active":true}"#);
        assert_eq!(calls[1], "GET /api/seasons");
        drain(&mut ui_rx);
    }

    #[tokio::test]
    async fn edit_season_fetches_and_opens_form() {
        let mut fake = FakeApi::new();
        fake.seasons = vec![season(2, "Fall", false)];
        let (_, mut state, ui_tx, mut ui_rx) = setup(fake);

        edit_season(&mut state, 2, &ui_tx).await;

        assert_eq!(state.editing_season_id, Some(2));
        let updates = drain(&mut ui_rx);
        assert!(updates
            .iter()
            .any(|u| matches!(u, UiUpdate::SeasonFormReady(s) if s.id == 2)));
    }

    // -----------------------------------------------------------------------
    // History page
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn history_filter_fetches_scoped_rolls() {
        let (api, mut state, ui_tx, mut ui_rx) = setup(FakeApi::new());

        handle_command(
            &mut state,
            UserCommand::SetHistoryFilter(Some(3)),
            &ui_tx,
        )
        .await;

        assert_eq!(api.calls(), vec!["GET /api/rolls?season_id=3"]);
        assert_eq!(state.season_filter, Some(3));
        let updates = drain(&mut ui_rx);
        assert!(updates.iter().any(|u| matches!(
            u,
            UiUpdate::HistoryLoaded { filter: Some(3), .. }
        )));
    }

    #[tokio::test]
    async fn open_roll_details_fetches_and_tracks_roll() {
        let mut fake = FakeApi::new();
        fake.roll = Some(roll_fixture(12, false));
        let (_, mut state, ui_tx, mut ui_rx) = setup(fake);

        open_roll_details(&mut state, 12, &ui_tx).await;

        assert_eq!(state.current_roll_id, Some(12));
        let updates = drain(&mut ui_rx);
        assert!(updates
            .iter()
            .any(|u| matches!(u, UiUpdate::RollDetails(r) if r.id == 12)));
    }

    #[tokio::test]
    async fn delete_roll_closes_overlay_and_reloads_filtered_list() {
        let (api, mut state, ui_tx, mut ui_rx) = setup(FakeApi::new());
        state.season_filter = Some(3);
        state.current_roll_id = Some(12);

        delete_roll(&mut state, 12, &ui_tx).await;

        assert_eq!(
            api.calls(),
            vec!["DELETE /api/rolls/12", "GET /api/rolls?season_id=3"]
        );
        assert!(state.current_roll_id.is_none());
        let updates = drain(&mut ui_rx);
        assert!(updates.contains(&UiUpdate::DetailsClosed));
    }

    #[tokio::test]
    async fn delete_roll_failure_leaves_overlay_open() {
        let mut fake = FakeApi::new();
        fake.fail = Some("delete_roll");
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);
        state.current_roll_id = Some(12);

        delete_roll(&mut state, 12, &ui_tx).await;

        assert_eq!(api.calls().len(), 1, "no reload after a failed delete");
        let updates = drain(&mut ui_rx);
        assert!(!updates.contains(&UiUpdate::DetailsClosed));
        assert_eq!(state.current_roll_id, Some(12));
    }

    #[tokio::test]
    async fn history_enrich_refetches_details_and_list() {
        let mut fake = FakeApi::new();
        fake.roll = Some(roll_fixture(12, true));
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);

        enrich_history_roll(&mut state, 12, &ui_tx).await;

        assert_eq!(
            api.calls(),
            vec![
                "POST /api/rolls/12/enrich",
                "GET /api/rolls/12",
                "GET /api/rolls"
            ]
        );
        let updates = drain(&mut ui_rx);
        assert_eq!(updates.first(), Some(&UiUpdate::EnrichStarted));
        assert_eq!(updates.last(), Some(&UiUpdate::EnrichFinished));
    }

    #[tokio::test]
    async fn history_enrich_failure_restores_trigger_without_reload() {
        let mut fake = FakeApi::new();
        fake.fail = Some("enrich_roll");
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);

        enrich_history_roll(&mut state, 12, &ui_tx).await;

        assert_eq!(api.calls(), vec!["POST /api/rolls/12/enrich"]);
        let updates = drain(&mut ui_rx);
        assert_eq!(updates.first(), Some(&UiUpdate::EnrichStarted));
        assert_eq!(updates.last(), Some(&UiUpdate::EnrichFinished));
    }

    #[tokio::test]
    async fn save_roll_notes_updates_details() {
        let mut fake = FakeApi::new();
        let mut enriched = roll_fixture(12, false);
        enriched.notes = Some("great pick".into());
        fake.roll = Some(enriched);
        let (api, mut state, ui_tx, mut ui_rx) = setup(fake);

        save_roll_notes(&mut state, 12, "great pick".into(), &ui_tx).await;

        assert_eq!(
            api.calls()[0],
            r#"PUT /api/rolls/12 {"notes":"great pick"}"#
        );
        let updates = drain(&mut ui_rx);
        assert!(updates
            .iter()
            .any(|u| matches!(u, UiUpdate::RollDetails(r) if r.notes.as_deref() == Some("great pick"))));
    }
}
