use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::allowlist::{AllowlistInput, ALLOWLIST_OPTION};
use crate::error::AppError;
use crate::startup::AppState;

pub const SETTINGS_PATH: &str = "/admin/allowlist";

#[derive(Debug, Default, Deserialize)]
pub struct SettingsPageQuery {
    #[serde(rename = "settings-updated", default)]
    pub settings_updated: bool,
}

/// Fields posted by the settings form
#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub signup_email_allowlist: String,
}

/// Body of a JSON allow-list replacement
#[derive(Debug, Default, Deserialize)]
pub struct AllowlistUpdate {
    #[serde(default)]
    pub emails: Option<AllowlistInput>,
}

/// GET /admin/allowlist
pub async fn settings_page(
    State(state): State<AppState>,
    Query(query): Query<SettingsPageQuery>,
) -> Result<Html<String>, (StatusCode, Json<Value>)> {
    let allowlist = state.store.get().await.map_err(|e| e.to_response())?;

    Ok(Html(render_settings_page(
        &allowlist.to_display_string(),
        query.settings_updated,
    )))
}

/// POST /admin/allowlist
///
/// Normalizes the submitted text, replaces the stored allow-list and sends
/// the browser back to the settings page.
pub async fn save_settings_form(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect, (StatusCode, Json<Value>)> {
    let allowlist = state.normalizer.normalize(form.signup_email_allowlist);
    state
        .store
        .set(&allowlist)
        .await
        .map_err(|e| e.to_response())?;

    info!(entries = allowlist.len(), "Signup allow-list saved");

    Ok(Redirect::to(&format!(
        "{}?settings-updated=true",
        SETTINGS_PATH
    )))
}

/// GET /admin/allowlist.json
pub async fn get_allowlist(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let allowlist = state.store.get().await.map_err(|e| e.to_response())?;
    Ok(Json(json!({ "emails": allowlist })))
}

/// PUT /admin/allowlist.json
///
/// Accepts `emails` as a comma-separated string or an array of strings and
/// responds with what was stored.
pub async fn replace_allowlist(
    State(state): State<AppState>,
    payload: Result<Json<AllowlistUpdate>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Json(update) = payload.map_err(|e| {
        AppError::BadRequest(format!("Invalid allow-list update: {}", e.body_text())).to_response()
    })?;

    let allowlist = state
        .normalizer
        .normalize(update.emails.unwrap_or_default());
    state
        .store
        .set(&allowlist)
        .await
        .map_err(|e| e.to_response())?;

    info!(entries = allowlist.len(), "Signup allow-list saved");

    Ok(Json(json!({ "emails": allowlist })))
}

/// Render the settings page HTML
fn render_settings_page(email_list: &str, settings_updated: bool) -> String {
    let notice_html = if settings_updated {
        r#"<div class="notice">Settings saved.</div>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Signup Allow-list</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f5f5f5; margin: 0; padding: 2rem; }}
        .container {{ background: white; padding: 2rem; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); max-width: 720px; }}
        h1 {{ font-size: 1.5rem; margin: 0 0 1.5rem; color: #333; }}
        h2 {{ font-size: 1rem; margin: 0 0 0.5rem; color: #333; }}
        .field {{ display: flex; flex-direction: column; margin-bottom: 1rem; }}
        label {{ margin-bottom: 0.5rem; color: #666; font-size: 0.875rem; }}
        textarea {{ min-height: 10rem; padding: 0.625rem; border: 1px solid #ddd; border-radius: 4px; font-family: monospace; font-size: 0.875rem; }}
        button {{ padding: 0.625rem 1.25rem; background: #0066cc; color: white; border: none; border-radius: 4px; font-size: 1rem; cursor: pointer; }}
        button:hover {{ background: #0052a3; }}
        .notice {{ background: #eef8ee; border: 1px solid #b6dfb6; color: #245c24; padding: 0.75rem; border-radius: 4px; margin-bottom: 1rem; }}
    </style>
</head>
<body>
    <div class="container" id="signup-allowlist-settings">
        <h1>Signup Allow-list Settings</h1>

        {notice_html}

        <form method="post" action="{action}">
            <h2>Email Allow-list</h2>
            <div class="field">
                <label for="{field}">Enter a comma-separated list of email addresses.</label>
                <textarea id="{field}" name="{field}">{email_list}</textarea>
            </div>
            <button type="submit">Save Changes</button>
        </form>
    </div>
</body>
</html>"#,
        notice_html = notice_html,
        action = SETTINGS_PATH,
        field = ALLOWLIST_OPTION,
        email_list = html_escape(email_list),
    )
}

/// HTML escape for XSS prevention
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
