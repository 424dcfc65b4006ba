use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use std::sync::Arc;

use crate::config::{AppConfig, AuthConfig};

const BASIC_REALM: &str = "Basic realm=\"signup-gate\"";

/// Authentication middleware for the admin settings surface
pub async fn admin_auth_middleware(
    State(app_config): State<Arc<AppConfig>>,
    request: Request,
    next: Next,
) -> Response {
    authorize(&app_config.admin.auth, request, next).await
}

/// Authentication middleware for the registration hook
pub async fn hook_auth_middleware(
    State(app_config): State<Arc<AppConfig>>,
    request: Request,
    next: Next,
) -> Response {
    authorize(&app_config.hook.auth, request, next).await
}

async fn authorize(auth: &AuthConfig, request: Request, next: Next) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match validate_authentication(auth, auth_header) {
        Ok(()) => next.run(request).await,
        Err(StatusCode::UNAUTHORIZED) => {
            let mut response = (
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Authentication required"})),
            )
                .into_response();
            if auth.auth_type == "basic" {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_REALM));
            }
            response
        }
        Err(status) => {
            tracing::error!("Unsupported authentication type: {}", auth.auth_type);
            (
                status,
                Json(json!({"message": "Authentication is misconfigured"})),
            )
                .into_response()
        }
    }
}

/// Check an `Authorization` header against the configured scheme
pub fn validate_authentication(
    auth: &AuthConfig,
    auth_header: Option<&str>,
) -> Result<(), StatusCode> {
    match auth.auth_type.as_str() {
        "unauthenticated" => Ok(()),
        "bearer" => {
            let provided_token = auth_header
                .and_then(|h| h.strip_prefix("Bearer "))
                .ok_or(StatusCode::UNAUTHORIZED)?;

            match &auth.token {
                Some(expected_token) if provided_token == expected_token => Ok(()),
                _ => Err(StatusCode::UNAUTHORIZED),
            }
        }
        "basic" => {
            let encoded_credentials = auth_header
                .and_then(|h| h.strip_prefix("Basic "))
                .ok_or(StatusCode::UNAUTHORIZED)?;

            let decoded = general_purpose::STANDARD
                .decode(encoded_credentials)
                .map_err(|_| StatusCode::UNAUTHORIZED)?;

            let credentials = String::from_utf8(decoded).map_err(|_| StatusCode::UNAUTHORIZED)?;

            let (provided_username, provided_password) = credentials
                .split_once(':')
                .ok_or(StatusCode::UNAUTHORIZED)?;

            match &auth.basic {
                Some(basic)
                    if provided_username == basic.username
                        && provided_password == basic.password =>
                {
                    Ok(())
                }
                _ => Err(StatusCode::UNAUTHORIZED),
            }
        }
        _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
