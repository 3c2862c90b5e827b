//! Per-session view state and user-intent dispatch.
//!
//! Each browser session owns one [`UiState`]: the sign-in machine, the
//! playlist and recommendation panes, the filter set and a notice line. Every
//! user intent is an explicit method producing the next view state; nothing is
//! recomputed ambiently. Mutating intents re-fetch the playlist from the
//! gateway afterwards so the displayed table never silently diverges from the
//! remote source of truth.

use std::collections::HashMap;

use crate::{
    config,
    error::ApiError,
    filters::FilterSet,
    session::{Session, TokenExchange},
    spotify::{AccountsClient, Gateway, generate_state_token},
    table::TrackTable,
    types::PlaylistSummary,
};

/// Skip-forward distance of the advance intent.
pub const SKIP_FORWARD_MS: u64 = 30_000;

/// A table pane plus the flag distinguishing "fetch failed" from "genuinely
/// empty". The flag carries the classified error text for display.
#[derive(Debug, Default)]
pub struct TablePane {
    pub table: TrackTable,
    pub fetch_failed: Option<String>,
}

impl TablePane {
    fn loaded(table: TrackTable) -> Self {
        TablePane {
            table,
            fetch_failed: None,
        }
    }

    fn failed(err: &ApiError) -> Self {
        TablePane {
            table: TrackTable::new(),
            fetch_failed: Some(err.to_string()),
        }
    }

    /// Resolves display-row indices to track ids, silently dropping indices
    /// that fell off after a re-render.
    pub fn ids_at(&self, rows: &[usize]) -> Vec<String> {
        rows.iter()
            .filter_map(|&row| self.table.get_index(row))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// The session context: all state belonging to one signed-in (or signing-in)
/// user, passed explicitly to every operation.
pub struct UiState {
    pub session: Session,
    pub playlist_id: String,
    pub playlist: TablePane,
    pub recommendations: TablePane,
    pub own_playlists: Vec<PlaylistSummary>,
    pub filters: FilterSet,
    pub notice: Option<String>,
    login_state: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            session: Session::new(),
            playlist_id: config::default_playlist_id(),
            playlist: TablePane::default(),
            recommendations: TablePane::default(),
            own_playlists: Vec::new(),
            filters: FilterSet::default(),
            notice: None,
            login_state: None,
        }
    }
}

impl UiState {
    /// Issues the authorization link for the login page, remembering the
    /// `state` token the callback must echo.
    pub fn begin_login(&mut self) -> String {
        let state = generate_state_token();
        let url = AccountsClient::authorize_url(&state);
        self.login_state = Some(state);
        url
    }

    /// Completes the redirect: verifies the `state` echo, captures the code
    /// and performs the single-use exchange.
    pub async fn complete_login(
        &mut self,
        code: &str,
        state: Option<&str>,
        exchanger: &impl TokenExchange,
    ) -> Result<(), ApiError> {
        match (&self.login_state, state) {
            (Some(expected), Some(got)) if expected == got => {}
            _ => {
                return Err(ApiError::Auth(
                    "state mismatch on authorization redirect".to_string(),
                ));
            }
        }
        self.login_state = None;

        self.session.receive_authorization_code(code)?;
        self.session.exchange_token(exchanger).await
    }

    /// Refreshes an expiring token before a batch of gateway calls. On a
    /// failed refresh the session has already dropped to signed-out; the
    /// caller only has to re-render.
    pub async fn prepare(&mut self, exchanger: &impl TokenExchange) -> Result<(), ApiError> {
        match self.session.ensure_fresh(exchanger).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.notice = Some("Session expired. Please sign in again.".to_string());
                Err(e)
            }
        }
    }

    /// Re-fetches the current playlist into the playlist pane. A failure
    /// empties the pane and sets its fetch-failed flag; an empty table with
    /// the flag set means "could not be determined", not "playlist is empty".
    pub async fn refresh_playlist(&mut self, gateway: &Gateway) {
        let username = config::spotify_user();
        match gateway
            .fetch_playlist(&self.session, &username, &self.playlist_id)
            .await
        {
            Ok(table) => self.playlist = TablePane::loaded(table),
            Err(e) => {
                self.handle_auth_failure(&e);
                self.playlist = TablePane::failed(&e);
            }
        }
    }

    /// Switches to another playlist and fetches it. The recommendation pane
    /// is left alone; its seeds simply no longer apply and the next
    /// recommendation request starts from the new playlist.
    pub async fn select_playlist(&mut self, gateway: &Gateway, playlist_id: String) {
        let playlist_id = playlist_id.trim().to_string();
        if playlist_id.is_empty() {
            self.notice = Some("Playlist id must not be empty.".to_string());
            return;
        }
        self.playlist_id = playlist_id;
        self.refresh_playlist(gateway).await;
    }

    /// Loads the signed-in user's own playlists for the chooser panel.
    pub async fn refresh_own_playlists(&mut self, gateway: &Gateway) {
        match gateway.fetch_user_playlists(&self.session).await {
            Ok(playlists) => self.own_playlists = playlists,
            Err(e) => {
                self.handle_auth_failure(&e);
                self.own_playlists = Vec::new();
            }
        }
    }

    /// Requests recommendations seeded by the selected playlist rows, using
    /// the current filter ranges.
    pub async fn request_recommendations(&mut self, gateway: &Gateway, seed_rows: &[usize]) {
        let seed_ids = self.playlist.ids_at(seed_rows);
        if seed_ids.is_empty() {
            self.notice = Some("Select at least one seed track first.".to_string());
            return;
        }

        match gateway
            .fetch_recommendations(&self.session, &seed_ids, &self.filters)
            .await
        {
            Ok(table) => self.recommendations = TablePane::loaded(table),
            Err(e) => {
                self.handle_auth_failure(&e);
                self.recommendations = TablePane::failed(&e);
            }
        }
    }

    /// Applies one submitted filter range; clamping happens in the filter
    /// set. Filter changes have no effect until the next recommendation
    /// request.
    pub fn apply_filter_range(&mut self, attribute: &str, low: f64, high: f64) {
        self.filters.set_range(attribute, low, high);
    }

    /// Plays the last-selected row of the given pane. Playback failures are
    /// reported on the notice line and leave all state unchanged.
    pub async fn play_row(&mut self, gateway: &Gateway, pane: Pane, rows: &[usize]) {
        let ids = self.pane(pane).ids_at(rows);
        let Some(track_id) = ids.last() else {
            self.notice = Some("Select a track to play.".to_string());
            return;
        };
        if let Err(e) = gateway.play_track(&self.session, track_id).await {
            self.report_playback_failure(&e);
        }
    }

    /// Stops playback; already-stopped counts as success at the gateway.
    pub async fn stop_playback(&mut self, gateway: &Gateway) {
        if let Err(e) = gateway.stop_playback(&self.session).await {
            self.report_playback_failure(&e);
        }
    }

    /// Skips 30 seconds forward in the current track.
    pub async fn skip_forward(&mut self, gateway: &Gateway) {
        if let Err(e) = gateway
            .advance_playback(&self.session, SKIP_FORWARD_MS)
            .await
        {
            self.report_playback_failure(&e);
        }
    }

    /// Adds the selected recommendation to the playlist, then re-fetches the
    /// playlist (the gateway keeps no cache to update).
    pub async fn add_recommendation(&mut self, gateway: &Gateway, rows: &[usize]) {
        let ids = self.recommendations.ids_at(rows);
        let Some(track_id) = ids.last() else {
            self.notice = Some("Select a recommendation to add.".to_string());
            return;
        };
        match gateway
            .add_track_to_playlist(&self.session, &self.playlist_id, track_id)
            .await
        {
            Ok(()) => self.refresh_playlist(gateway).await,
            Err(e) => {
                self.handle_auth_failure(&e);
                self.notice = Some(format!("Could not add track: {e}"));
            }
        }
    }

    /// Removes the selected playlist rows, then re-fetches the playlist.
    pub async fn remove_playlist_rows(&mut self, gateway: &Gateway, rows: &[usize]) {
        let ids = self.playlist.ids_at(rows);
        if ids.is_empty() {
            self.notice = Some("Select tracks to delete first.".to_string());
            return;
        }
        match gateway
            .remove_tracks_from_playlist(&self.session, &self.playlist_id, &ids)
            .await
        {
            Ok(()) => self.refresh_playlist(gateway).await,
            Err(e) => {
                self.handle_auth_failure(&e);
                self.notice = Some(format!("Could not delete tracks: {e}"));
            }
        }
    }

    /// Explicit sign-out: clears token state and all fetched panes.
    pub fn sign_out(&mut self) {
        self.session.sign_out();
        self.playlist = TablePane::default();
        self.recommendations = TablePane::default();
        self.own_playlists = Vec::new();
        self.notice = None;
    }

    /// Clears and returns the notice line for display.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    fn pane(&self, pane: Pane) -> &TablePane {
        match pane {
            Pane::Playlist => &self.playlist,
            Pane::Recommendations => &self.recommendations,
        }
    }

    /// Authentication failures invalidate the sign-in; everything else is
    /// left to the caller to surface.
    fn handle_auth_failure(&mut self, err: &ApiError) {
        if err.is_auth() {
            self.session.sign_out();
            self.notice = Some("Session expired. Please sign in again.".to_string());
        }
    }

    fn report_playback_failure(&mut self, err: &ApiError) {
        self.handle_auth_failure(err);
        match err {
            ApiError::NoActiveDevice => {
                self.notice = Some(
                    "No active Spotify device. Start playback on any device and retry."
                        .to_string(),
                );
            }
            e if e.is_auth() => {} // notice already set
            e => self.notice = Some(format!("Playback command failed: {e}")),
        }
    }
}

/// Which table pane a row selection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Playlist,
    Recommendations,
}

/// Sessions keyed by the random session-id cookie. One [`UiState`] per key;
/// two keys never share state.
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<String, UiState>,
}

impl SessionStore {
    pub fn get_or_create(&mut self, session_id: &str) -> &mut UiState {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
