//! HTML panels and intent handlers.
//!
//! One GET route renders the whole page from the current session context;
//! every user intent is a POST route that dispatches to the controller and
//! answers with a redirect back to the page (post/redirect/get). Row
//! selections arrive as `row-<index>` checkbox fields and are resolved
//! against the pane the form names, so selection state lives in the form
//! submission and nowhere else.

use std::collections::HashMap;

use axum::{Extension, Form, http::HeaderMap, response::Response};

use crate::controller::{Pane, TablePane, UiState};

use super::{SharedContext, ensure_session, html_response, redirect_response};

pub async fn index(headers: HeaderMap, Extension(ctx): Extension<SharedContext>) -> Response {
    let (session_id, new_session) = ensure_session(&headers);
    let mut store = ctx.store.lock().await;
    let ui = store.get_or_create(&session_id);

    if ui.session.is_authorized() {
        // a failed refresh drops the session; the login page renders below
        let _ = ui.prepare(&ctx.accounts).await;
    }

    let body = if ui.session.is_authorized() {
        render_main(ui)
    } else {
        render_login(ui)
    };
    html_response(&session_id, new_session, body)
}

pub async fn select_playlist(
    headers: HeaderMap,
    Extension(ctx): Extension<SharedContext>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let (session_id, new_session) = ensure_session(&headers);
    let mut store = ctx.store.lock().await;
    let ui = store.get_or_create(&session_id);

    if ui.session.is_authorized() && ui.prepare(&ctx.accounts).await.is_ok() {
        match chosen_playlist(&form) {
            Some(playlist_id) => ui.select_playlist(&ctx.gateway, playlist_id).await,
            None => ui.notice = Some("Choose a playlist or paste an id first.".to_string()),
        }
    }
    redirect_response(&session_id, new_session, "/")
}

pub async fn recommend(
    headers: HeaderMap,
    Extension(ctx): Extension<SharedContext>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let (session_id, new_session) = ensure_session(&headers);
    let mut store = ctx.store.lock().await;
    let ui = store.get_or_create(&session_id);

    if ui.session.is_authorized() && ui.prepare(&ctx.accounts).await.is_ok() {
        apply_filter_form(ui, &form);
        let rows = selected_rows(&form);
        ui.request_recommendations(&ctx.gateway, &rows).await;
    }
    redirect_response(&session_id, new_session, "/")
}

pub async fn play(
    headers: HeaderMap,
    Extension(ctx): Extension<SharedContext>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let (session_id, new_session) = ensure_session(&headers);
    let mut store = ctx.store.lock().await;
    let ui = store.get_or_create(&session_id);

    if ui.session.is_authorized() && ui.prepare(&ctx.accounts).await.is_ok() {
        let rows = selected_rows(&form);
        ui.play_row(&ctx.gateway, pane_from(&form), &rows).await;
    }
    redirect_response(&session_id, new_session, "/")
}

pub async fn stop(
    headers: HeaderMap,
    Extension(ctx): Extension<SharedContext>,
    Form(_): Form<HashMap<String, String>>,
) -> Response {
    let (session_id, new_session) = ensure_session(&headers);
    let mut store = ctx.store.lock().await;
    let ui = store.get_or_create(&session_id);

    if ui.session.is_authorized() && ui.prepare(&ctx.accounts).await.is_ok() {
        ui.stop_playback(&ctx.gateway).await;
    }
    redirect_response(&session_id, new_session, "/")
}

pub async fn track_add(
    headers: HeaderMap,
    Extension(ctx): Extension<SharedContext>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let (session_id, new_session) = ensure_session(&headers);
    let mut store = ctx.store.lock().await;
    let ui = store.get_or_create(&session_id);

    if ui.session.is_authorized() && ui.prepare(&ctx.accounts).await.is_ok() {
        let rows = selected_rows(&form);
        ui.add_recommendation(&ctx.gateway, &rows).await;
    }
    redirect_response(&session_id, new_session, "/")
}

pub async fn remove(
    headers: HeaderMap,
    Extension(ctx): Extension<SharedContext>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let (session_id, new_session) = ensure_session(&headers);
    let mut store = ctx.store.lock().await;
    let ui = store.get_or_create(&session_id);

    if ui.session.is_authorized() && ui.prepare(&ctx.accounts).await.is_ok() {
        let rows = selected_rows(&form);
        ui.remove_playlist_rows(&ctx.gateway, &rows).await;
    }
    redirect_response(&session_id, new_session, "/")
}

pub async fn advance(
    headers: HeaderMap,
    Extension(ctx): Extension<SharedContext>,
    Form(_): Form<HashMap<String, String>>,
) -> Response {
    let (session_id, new_session) = ensure_session(&headers);
    let mut store = ctx.store.lock().await;
    let ui = store.get_or_create(&session_id);

    if ui.session.is_authorized() && ui.prepare(&ctx.accounts).await.is_ok() {
        ui.skip_forward(&ctx.gateway).await;
    }
    redirect_response(&session_id, new_session, "/")
}

pub async fn signout(headers: HeaderMap, Extension(ctx): Extension<SharedContext>) -> Response {
    let (session_id, new_session) = ensure_session(&headers);
    let mut store = ctx.store.lock().await;
    let ui = store.get_or_create(&session_id);
    ui.sign_out();
    redirect_response(&session_id, new_session, "/")
}

/// Checkbox fields are named `row-<display index>`; unparsable suffixes are
/// dropped, the result is sorted so "last selected" means last in table
/// order.
fn selected_rows(form: &HashMap<String, String>) -> Vec<usize> {
    let mut rows: Vec<usize> = form
        .keys()
        .filter_map(|key| key.strip_prefix("row-"))
        .filter_map(|index| index.parse().ok())
        .collect();
    rows.sort_unstable();
    rows
}

fn pane_from(form: &HashMap<String, String>) -> Pane {
    match form.get("pane").map(String::as_str) {
        Some("recommendations") => Pane::Recommendations,
        _ => Pane::Playlist,
    }
}

/// The pasted id wins over the dropdown choice.
fn chosen_playlist(form: &HashMap<String, String>) -> Option<String> {
    let typed = form
        .get("playlist-id")
        .map(|value| value.trim())
        .filter(|value| !value.is_empty());
    let picked = form
        .get("playlist-select")
        .map(|value| value.trim())
        .filter(|value| !value.is_empty());
    typed.or(picked).map(str::to_string)
}

/// Submitted ranges land in `min-<attr>` / `max-<attr>` fields; pairs that
/// don't parse are ignored, clamping happens in the filter set.
fn apply_filter_form(ui: &mut UiState, form: &HashMap<String, String>) {
    let attributes: Vec<&'static str> = ui.filters.iter().map(|(name, _)| name).collect();
    for name in attributes {
        let low = form
            .get(&format!("min-{name}"))
            .and_then(|value| value.parse::<f64>().ok());
        let high = form
            .get(&format!("max-{name}"))
            .and_then(|value| value.parse::<f64>().ok());
        if let (Some(low), Some(high)) = (low, high) {
            ui.apply_filter_range(name, low, high);
        }
    }
}

pub(crate) fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_login(ui: &mut UiState) -> String {
    let notice = ui
        .take_notice()
        .map(|text| format!("<p class=\"notice\">{}</p>", escape(&text)))
        .unwrap_or_default();
    let auth_url = ui.begin_login();

    format!(
        "<html><head><title>cratedig</title>{style}</head><body>\
         <h1>cratedig</h1>{notice}\
         <p>Sign in with your Spotify account to start digging.</p>\
         <p><a class=\"button\" href=\"{auth_url}\">Sign in with Spotify</a></p>\
         </body></html>",
        style = STYLE,
    )
}

fn render_main(ui: &mut UiState) -> String {
    let notice = ui
        .take_notice()
        .map(|text| format!("<p class=\"notice\">{}</p>", escape(&text)))
        .unwrap_or_default();

    format!(
        "<html><head><title>cratedig</title>{style}</head><body>\
         <h1>cratedig</h1>{notice}\
         {selector}<hr>{playlist}<hr>{recommendations}<hr>\
         <form method=\"post\" action=\"/signout\"><button>Sign out</button></form>\
         </body></html>",
        style = STYLE,
        selector = render_selector(ui),
        playlist = render_playlist_panel(ui),
        recommendations = render_recommendations_panel(ui),
    )
}

fn render_selector(ui: &UiState) -> String {
    let mut options = String::from("<option value=\"\">your playlists</option>");
    for playlist in &ui.own_playlists {
        let selected = if playlist.id == ui.playlist_id {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            "<option value=\"{id}\"{selected}>{name}</option>",
            id = escape(&playlist.id),
            name = escape(&playlist.name),
        ));
    }

    format!(
        "<form method=\"post\" action=\"/playlist\">\
         <label>Playlist</label> <select name=\"playlist-select\">{options}</select> \
         <input type=\"text\" name=\"playlist-id\" placeholder=\"...or paste a playlist id\"> \
         <button>Load</button></form>",
    )
}

fn render_playlist_panel(ui: &UiState) -> String {
    format!(
        "<h2>Playlist</h2>\
         <form method=\"post\" action=\"/recommend\">\
         <input type=\"hidden\" name=\"pane\" value=\"playlist\">\
         {table}\
         <details open><summary>Recommendation filters</summary>{filters}</details>\
         <button formaction=\"/play\">&#9654; Play</button> \
         <button formaction=\"/stop\">&#9632; Stop</button> \
         <button type=\"submit\">Generate recommendations</button> \
         <button formaction=\"/remove\">Delete tracks</button>\
         </form>",
        table = render_table(&ui.playlist, "The playlist is empty."),
        filters = render_filters(ui),
    )
}

fn render_recommendations_panel(ui: &UiState) -> String {
    format!(
        "<h2>Recommendations</h2>\
         <form method=\"post\" action=\"/add\">\
         <input type=\"hidden\" name=\"pane\" value=\"recommendations\">\
         {table}\
         <button formaction=\"/play\">&#9654; Play</button> \
         <button formaction=\"/stop\">&#9632; Stop</button> \
         <button type=\"submit\">Add to playlist</button> \
         <button formaction=\"/advance\">&#9193; Skip forward</button>\
         </form>",
        table = render_table(&ui.recommendations, "No recommendations yet."),
    )
}

fn render_table(pane: &TablePane, empty_message: &str) -> String {
    if let Some(reason) = &pane.fetch_failed {
        // distinguish "could not be determined" from "genuinely empty"
        return format!(
            "<p class=\"error\">Could not load this table: {reason}. \
             The list may not actually be empty.</p>",
            reason = escape(reason),
        );
    }
    if pane.table.is_empty() {
        return format!("<p>{}</p>", escape(empty_message));
    }

    let mut rows = String::new();
    for (display_index, record) in pane.table.values().enumerate() {
        rows.push_str(&format!(
            "<tr><td><input type=\"checkbox\" name=\"row-{display_index}\"></td>\
             <td>{position}</td><td>{track}</td><td>{artist}</td></tr>",
            position = record.position,
            track = escape(&record.track_name),
            artist = escape(&record.artist_name),
        ));
    }

    format!(
        "<table><thead><tr><th></th><th>#</th><th>Track</th><th>Artist</th></tr></thead>\
         <tbody>{rows}</tbody></table>",
    )
}

fn render_filters(ui: &UiState) -> String {
    let mut fields = String::new();
    for (name, spec) in ui.filters.iter() {
        let step = spec.step.unwrap_or(1.0);
        fields.push_str(&format!(
            "<div class=\"filter\"><label>{label}</label> \
             <input type=\"number\" name=\"min-{name}\" value=\"{low}\" \
              min=\"{min}\" max=\"{max}\" step=\"{step}\"> &ndash; \
             <input type=\"number\" name=\"max-{name}\" value=\"{high}\" \
              min=\"{min}\" max=\"{max}\" step=\"{step}\"></div>",
            label = escape(spec.label),
            low = spec.low,
            high = spec.high,
            min = spec.min,
            max = spec.max,
        ));
    }
    fields
}

const STYLE: &str = "<style>\
  body { font-family: sans-serif; margin: 2em; max-width: 60em; }\
  table { border-collapse: collapse; margin: 1em 0; }\
  td, th { border: 1px solid #ccc; padding: 0.3em 0.7em; text-align: left; }\
  .notice { color: #a40; } .error { color: #a00; }\
  .filter { display: inline-block; margin: 0.3em 1em 0.3em 0; }\
  .filter input { width: 5em; }\
  </style>";
