use std::collections::HashMap;

use axum::{Extension, extract::Query, http::HeaderMap, response::Response};

use crate::{info, warning};

use super::{SharedContext, ensure_session, html_response, redirect_response};

/// OAuth redirect target.
///
/// The accounts service sends the browser here with a single-use `code` and
/// the `state` echo. The controller verifies the echo, captures the code and
/// performs the exchange; a repeated delivery of the same code (browser
/// reload of the callback URL) fails cleanly instead of re-exchanging.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Extension(ctx): Extension<SharedContext>,
) -> Response {
    let (session_id, new_session) = ensure_session(&headers);
    let mut store = ctx.store.lock().await;
    let ui = store.get_or_create(&session_id);

    if let Some(reason) = params.get("error") {
        warning!("Authorization was denied: {}", reason);
        return html_response(
            &session_id,
            new_session,
            error_page(&format!("Authorization was denied: {reason}")),
        );
    }

    let Some(code) = params.get("code") else {
        return html_response(
            &session_id,
            new_session,
            error_page("Missing authorization code."),
        );
    };
    let state = params.get("state").map(String::as_str);

    match ui.complete_login(code, state, &ctx.accounts).await {
        Ok(()) => {
            info!("Sign-in completed for session {}...", &session_id[..8.min(session_id.len())]);
            ui.refresh_own_playlists(&ctx.gateway).await;
            ui.refresh_playlist(&ctx.gateway).await;
            redirect_response(&session_id, new_session, "/")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            html_response(&session_id, new_session, error_page(&format!("Sign-in failed: {e}")))
        }
    }
}

fn error_page(message: &str) -> String {
    format!(
        "<html><body><h4>{message}</h4><p><a href=\"/\">Back to the set builder</a></p></body></html>",
        message = super::panels::escape(message),
    )
}
