//! Classified error taxonomy for everything that crosses the network.
//!
//! Every failure from the accounts endpoint or the Web API is mapped into
//! exactly one [`ApiError`] variant before it reaches a caller. Raw
//! `reqwest::Error` values never leave the `spotify` module; the controller
//! and the HTML panels only ever see classified errors and decide per variant
//! whether to force a sign-out, show a notice, or flag a pane as failed.

use thiserror::Error;

/// Errors produced by the session state machine and the streaming gateway.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Invalid, expired or reused authorization code, or an expired token.
    /// Forces the session back to the signed-out state.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The remote API could not be reached (connect, timeout, transport).
    #[error("network failure: {0}")]
    Network(String),

    /// Unknown playlist, username or track.
    #[error("not found: {0}")]
    NotFound(String),

    /// A playback command was issued while no device is active. The user can
    /// recover by starting playback on any Spotify client.
    #[error("no active playback device")]
    NoActiveDevice,

    /// A raw track payload is missing a required field.
    #[error("malformed track payload: {0}")]
    MalformedTrack(String),

    /// The remote service answered, but with an error we don't classify
    /// further (rate limiting, 5xx, unexpected body).
    #[error("service error: {0}")]
    Service(String),
}

impl ApiError {
    /// True for failures that invalidate the current sign-in.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    /// True for transport-level failures that may be retried on reads.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || (err.is_request() && err.status().is_none()) {
            return ApiError::Network(err.to_string());
        }
        match err.status() {
            Some(status) if status == reqwest::StatusCode::UNAUTHORIZED => {
                ApiError::Auth("access token rejected".to_string())
            }
            Some(status) if status == reqwest::StatusCode::FORBIDDEN => {
                ApiError::Auth("insufficient scope or rejected credentials".to_string())
            }
            Some(status) if status == reqwest::StatusCode::NOT_FOUND => {
                ApiError::NotFound("resource not found".to_string())
            }
            Some(status) => ApiError::Service(format!("request failed with status {status}")),
            None => ApiError::Network(err.to_string()),
        }
    }
}
