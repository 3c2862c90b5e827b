//! Configuration management for the DJ set builder.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage application configuration including Spotify API credentials, server
//! settings, and other runtime parameters.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (endpoint URLs, scope, default playlist)
//!
//! The four credentials and the listen address have no defaults; their absence
//! is a startup failure surfaced by [`ensure_required`], never a runtime one.

use dotenv;
use std::{env, path::PathBuf};

/// Environment variables that must be present before the server starts.
const REQUIRED_VARS: [&str; 5] = [
    "SPOTIFY_API_AUTH_CLIENT_ID",
    "SPOTIFY_API_AUTH_CLIENT_SECRET",
    "SPOTIFY_API_REDIRECT_URI",
    "SPOTIFY_USER_ID",
    "SERVER_ADDRESS",
];

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `cratedig/.env`. This allows users to store
/// configuration securely without hardcoding sensitive values.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/cratedig/.env`
/// - macOS: `~/Library/Application Support/cratedig/.env`
/// - Windows: `%LOCALAPPDATA%/cratedig/.env`
///
/// A missing file is not an error; configuration may come entirely from the
/// process environment.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("cratedig/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Verifies that every required configuration value is present.
///
/// Returns the names of all missing variables so the startup error can list
/// them in one go instead of failing on the first accessor that panics.
pub fn ensure_required() -> Result<(), String> {
    let missing: Vec<&str> = REQUIRED_VARS
        .iter()
        .filter(|var| env::var(var).map(|v| v.trim().is_empty()).unwrap_or(true))
        .copied()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("missing required variables: {}", missing.join(", ")))
    }
}

/// Returns the address and port the HTTP server binds to.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set. Call
/// [`ensure_required`] at startup first.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the Spotify user whose playlists are browsed and mutated.
///
/// # Panics
///
/// Panics if the `SPOTIFY_USER_ID` environment variable is not set.
pub fn spotify_user() -> String {
    env::var("SPOTIFY_USER_ID").expect("SPOTIFY_USER_ID must be set")
}

/// Returns the Spotify API client ID for authentication.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the Spotify API client secret for authentication.
///
/// The secret authenticates the token exchange (HTTP Basic together with the
/// client ID). It should never appear in logs or version control.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_SECRET` environment variable is not
/// set.
pub fn spotify_client_secret() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET").expect("SPOTIFY_API_AUTH_CLIENT_SECRET must be set")
}

/// Returns the OAuth redirect URI registered with the Spotify application.
///
/// Spotify redirects the browser here with the authorization `code` query
/// parameter; it must point at this server's `/callback` route.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_REDIRECT_URI` environment variable is not set.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

/// Returns the OAuth scope requested during authorization.
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| {
        "user-read-playback-state user-modify-playback-state \
         playlist-read-private playlist-modify-private playlist-modify-public"
            .to_string()
    })
}

/// Returns the Spotify OAuth authorization URL.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string())
}

/// Returns the Spotify Web API base URL.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// Returns the Spotify OAuth token exchange URL.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}

/// Returns the playlist preselected in the playlist chooser panel.
pub fn default_playlist_id() -> String {
    env::var("DEFAULT_PLAYLIST_ID").unwrap_or_else(|_| "6PMDU7e878EQuN4AA4GOag".to_string())
}
