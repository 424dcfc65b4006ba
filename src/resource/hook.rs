use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::startup::AppState;

/// Body sent by the host before it creates an account
#[derive(Debug, Deserialize)]
pub struct PreUserEmailRequest {
    #[serde(default)]
    pub email: String,
}

/// POST /hooks/pre-user-email
///
/// Runs the registration gate on the candidate email. A 200 response carries
/// the email the host should continue with; a 403 is terminal and its
/// `message` is meant to be shown to the user.
pub async fn pre_user_email(
    State(state): State<AppState>,
    payload: Result<Json<PreUserEmailRequest>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Json(request) = payload.map_err(|e| {
        AppError::BadRequest(format!("Invalid request body: {}", e.body_text())).to_response()
    })?;

    let email = state
        .gate
        .check_email(&request.email)
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(json!({ "email": email })))
}
