//! Streaming service gateway.
//!
//! Wraps every Web API interaction behind operations that take the session
//! context, classify all failures into [`ApiError`] and never leak a raw
//! `reqwest::Error`. The gateway holds no playlist-level state of its own:
//! usernames and playlist ids come from the caller on every call, so the UI
//! layer stays the sole owner of "current" selections.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    config,
    error::ApiError,
    filters::FilterSet,
    session::Session,
    table::{self, TrackTable},
    types::{
        AddTracksRequest, CurrentlyPlayingResponse, PlaylistResponse, PlaylistSummary,
        RecommendationsResponse, RemoveTracksRequest, SnapshotResponse, StartPlaybackRequest,
        TrackRef, UserPlaylistsResponse,
    },
    warning,
};

/// Fixed result limit of the recommendations endpoint.
pub const RECOMMENDATION_LIMIT: usize = 20;

/// Bound on every outbound call; the remote API is an untrusted network
/// dependency.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Backoff before the single retry on idempotent reads.
const RETRY_BACKOFF: Duration = Duration::from_millis(750);

pub struct Gateway {
    client: Client,
}

impl Gateway {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Gateway { client })
    }

    /// Fetches a playlist owned by `username` and tabulates its tracks.
    ///
    /// Idempotent read: retried once after a short backoff on a network
    /// failure. Any failure reaches the caller as a classified error; the
    /// controller turns it into an empty pane with a visible "fetch failed"
    /// flag so an unreachable playlist is never confused with an empty one.
    pub async fn fetch_playlist(
        &self,
        session: &Session,
        username: &str,
        playlist_id: &str,
    ) -> Result<TrackTable, ApiError> {
        let token = session.access_token()?;
        let url = format!(
            "{uri}/users/{username}/playlists/{playlist_id}",
            uri = &config::spotify_apiurl(),
        );
        let response: PlaylistResponse = self.get_json_retrying(&url, token, "playlist").await?;
        Ok(table::tabulate_playlist(&response))
    }

    /// Requests recommendations seeded by `seed_ids`, constrained by the
    /// selected filter ranges, limited to [`RECOMMENDATION_LIMIT`] rows.
    pub async fn fetch_recommendations(
        &self,
        session: &Session,
        seed_ids: &[String],
        filters: &FilterSet,
    ) -> Result<TrackTable, ApiError> {
        let token = session.access_token()?;
        if seed_ids.is_empty() {
            return Err(ApiError::Service(
                "at least one seed track is required".to_string(),
            ));
        }

        let mut url = format!(
            "{uri}/recommendations?limit={limit}&seed_tracks={seeds}",
            uri = &config::spotify_apiurl(),
            limit = RECOMMENDATION_LIMIT,
            seeds = seed_ids.join(","),
        );
        for (name, value) in filters.query_params() {
            url.push_str(&format!("&{name}={value}"));
        }

        let response: RecommendationsResponse =
            self.get_json_retrying(&url, token, "recommendations").await?;
        let mut recommendations = table::tabulate_recommendations(&response);
        recommendations.truncate(RECOMMENDATION_LIMIT);
        Ok(recommendations)
    }

    /// Lists the signed-in user's own playlists for the chooser panel.
    pub async fn fetch_user_playlists(
        &self,
        session: &Session,
    ) -> Result<Vec<PlaylistSummary>, ApiError> {
        let token = session.access_token()?;
        let url = format!("{uri}/me/playlists?limit=50", uri = &config::spotify_apiurl());
        let response: UserPlaylistsResponse =
            self.get_json_retrying(&url, token, "playlists").await?;
        Ok(response.items)
    }

    /// Starts playback of a single track on the user's active device.
    ///
    /// "No active device" is reported as [`ApiError::NoActiveDevice`]; the
    /// user recovers by starting playback on any Spotify client first.
    pub async fn play_track(&self, session: &Session, track_id: &str) -> Result<(), ApiError> {
        let token = session.access_token()?;
        let url = format!("{uri}/me/player/play", uri = &config::spotify_apiurl());
        let body = StartPlaybackRequest {
            uris: vec![format!("spotify:track:{track_id}")],
        };

        let response = self
            .client
            .put(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::expect_success(response, true, "playback start").map(|_| ())
    }

    /// Pauses playback. Idempotent: pausing an already stopped player (or no
    /// player at all) counts as success.
    pub async fn stop_playback(&self, session: &Session) -> Result<(), ApiError> {
        let token = session.access_token()?;
        let url = format!("{uri}/me/player/pause", uri = &config::spotify_apiurl());

        let response = self
            .client
            .put(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        // already paused or no device at all: nothing left to stop
        if status == StatusCode::NOT_FOUND || status == StatusCode::FORBIDDEN {
            return Ok(());
        }
        Self::expect_success(response, true, "playback stop").map(|_| ())
    }

    /// Appends one track to the playlist. Mutating call: the gateway updates
    /// no local cache, the caller must re-fetch the playlist afterwards.
    pub async fn add_track_to_playlist(
        &self,
        session: &Session,
        playlist_id: &str,
        track_id: &str,
    ) -> Result<(), ApiError> {
        let token = session.access_token()?;
        let url = format!(
            "{uri}/playlists/{playlist_id}/tracks",
            uri = &config::spotify_apiurl(),
        );
        let body = AddTracksRequest {
            uris: vec![format!("spotify:track:{track_id}")],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = Self::expect_success(response, false, "playlist")?;
        let _: SnapshotResponse = response.json().await.map_err(ApiError::from)?;
        Ok(())
    }

    /// Removes all occurrences of the given tracks from the playlist.
    /// Mutating call; never retried, callers re-fetch afterwards.
    pub async fn remove_tracks_from_playlist(
        &self,
        session: &Session,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), ApiError> {
        let token = session.access_token()?;
        let url = format!(
            "{uri}/playlists/{playlist_id}/tracks",
            uri = &config::spotify_apiurl(),
        );
        let body = RemoveTracksRequest {
            tracks: track_ids
                .iter()
                .map(|id| TrackRef {
                    uri: format!("spotify:track:{id}"),
                })
                .collect(),
        };

        let response = self
            .client
            .delete(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = Self::expect_success(response, false, "playlist")?;
        let _: SnapshotResponse = response.json().await.map_err(ApiError::from)?;
        Ok(())
    }

    /// Skips forward: reads the current playback progress and seeks to
    /// `progress + offset_ms`. With nothing playing this reports
    /// [`ApiError::NoActiveDevice`] and changes nothing.
    pub async fn advance_playback(
        &self,
        session: &Session,
        offset_ms: u64,
    ) -> Result<(), ApiError> {
        let token = session.access_token()?;
        let url = format!(
            "{uri}/me/player/currently-playing",
            uri = &config::spotify_apiurl(),
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if response.status() == StatusCode::NO_CONTENT {
            return Err(ApiError::NoActiveDevice);
        }
        let response = Self::expect_success(response, true, "playback progress")?;
        let playing: CurrentlyPlayingResponse = response.json().await.map_err(ApiError::from)?;
        let progress = playing.progress_ms.ok_or(ApiError::NoActiveDevice)?;

        let seek_url = format!(
            "{uri}/me/player/seek?position_ms={position}",
            uri = &config::spotify_apiurl(),
            position = progress + offset_ms,
        );
        let response = self
            .client
            .put(&seek_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::expect_success(response, true, "seek").map(|_| ())
    }

    /// GET + JSON decode with a single retry on network failures. Only used
    /// for idempotent reads; mutating calls go out exactly once.
    async fn get_json_retrying<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        what: &str,
    ) -> Result<T, ApiError> {
        match self.get_json(url, token, what).await {
            Err(e) if e.is_network() => {
                warning!("Retrying {} fetch after network failure: {}", what, e);
                sleep(RETRY_BACKOFF).await;
                self.get_json(url, token, what).await
            }
            other => other,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = Self::expect_success(response, false, what)?;
        response.json::<T>().await.map_err(ApiError::from)
    }

    /// Maps a non-success status into the error taxonomy. `player` flags the
    /// player endpoints, where a 404 means "no active device" rather than an
    /// unknown resource.
    fn expect_success(
        response: Response,
        player: bool,
        what: &str,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let err = if status == StatusCode::UNAUTHORIZED {
            ApiError::Auth("access token expired or revoked".to_string())
        } else if status == StatusCode::FORBIDDEN && !player {
            ApiError::Auth("access denied for this account".to_string())
        } else if status == StatusCode::FORBIDDEN {
            ApiError::Service(format!("{what}: command rejected by the player"))
        } else if status == StatusCode::NOT_FOUND && player {
            ApiError::NoActiveDevice
        } else if status == StatusCode::NOT_FOUND {
            ApiError::NotFound(what.to_string())
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            ApiError::Service(format!("{what}: rate limited by the API"))
        } else if status == StatusCode::BAD_GATEWAY
            || status == StatusCode::SERVICE_UNAVAILABLE
            || status == StatusCode::GATEWAY_TIMEOUT
        {
            ApiError::Network(format!("{what}: upstream answered {status}"))
        } else {
            ApiError::Service(format!("{what}: status {status}"))
        };
        Err(err)
    }
}
