//! # API Module
//!
//! HTTP endpoints for the web application: the OAuth callback that completes
//! the sign-in flow, a health check, and the HTML panels with their intent
//! handlers (playlist chooser, seed selection, recommendation actions,
//! playback controls).
//!
//! ## Session handling
//!
//! Browser sessions are identified by a random cookie. Each request resolves
//! its cookie to a per-session [`crate::controller::UiState`] in the shared
//! [`crate::controller::SessionStore`]; two session ids never share state.
//! The store lock is held for the duration of one request, so session state
//! is exclusively owned by the single request-handling context.
//!
//! ## Endpoints
//!
//! - [`callback`] - OAuth redirect target; captures the single-use code
//! - [`health`] - status/version for monitoring
//! - [`panels`] - `GET /` plus the POST intent routes

mod callback;
mod health;
mod panels;

pub use callback::callback;
pub use health::health;
pub use panels::{
    advance, index, play, recommend, remove, select_playlist, signout, stop, track_add,
};

use std::sync::Arc;

use axum::{
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use tokio::sync::Mutex;

use crate::{
    controller::SessionStore,
    spotify::{AccountsClient, Gateway, generate_state_token},
};

/// Shared application context handed to every handler as an axum Extension.
pub struct AppContext {
    pub store: Mutex<SessionStore>,
    pub gateway: Gateway,
    pub accounts: AccountsClient,
}

pub type SharedContext = Arc<AppContext>;

const SESSION_COOKIE: &str = "cratedig_session";

/// Resolves the session id from the request cookie, creating a fresh random
/// id when none is present. The `bool` says whether the response has to set
/// the cookie.
pub fn ensure_session(headers: &HeaderMap) -> (String, bool) {
    match session_id_from(headers) {
        Some(session_id) => (session_id, false),
        None => (generate_state_token(), true),
    }
}

fn session_id_from(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|part| {
        let (name, value) = part.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

fn session_cookie(session_id: &str) -> String {
    format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Wraps an HTML body, attaching the session cookie when it is new.
pub fn html_response(session_id: &str, new_session: bool, body: String) -> Response {
    if new_session {
        (
            [(header::SET_COOKIE, session_cookie(session_id))],
            Html(body),
        )
            .into_response()
    } else {
        Html(body).into_response()
    }
}

/// Post/redirect/get: every intent handler answers with a redirect back to
/// the panel page, attaching the session cookie when it is new.
pub fn redirect_response(session_id: &str, new_session: bool, to: &str) -> Response {
    if new_session {
        (
            [(header::SET_COOKIE, session_cookie(session_id))],
            Redirect::to(to),
        )
            .into_response()
    } else {
        Redirect::to(to).into_response()
    }
}
