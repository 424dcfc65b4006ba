use axum::{http::StatusCode, Json};
use serde_json::json;
use std::fmt;

/// Error code reported to the host when a registration is blocked
pub const FORBIDDEN_EMAIL_CODE: &str = "forbidden_user_email";

/// Default user-facing message for a blocked registration
pub const DEFAULT_FORBIDDEN_MESSAGE: &str = "Sorry, that email address is not allowed!";

/// Terminal rejection of a registration attempt by the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenEmail {
    pub message: String,
}

impl ForbiddenEmail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        FORBIDDEN_EMAIL_CODE
    }
}

impl Default for ForbiddenEmail {
    fn default() -> Self {
        Self::new(DEFAULT_FORBIDDEN_MESSAGE)
    }
}

impl fmt::Display for ForbiddenEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message)
    }
}

#[derive(Debug)]
pub enum AppError {
    Database(String),
    Serialization(serde_json::Error),
    BadRequest(String),
    Internal(String),
    Configuration(String),
    ForbiddenEmail(ForbiddenEmail),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Serialization(e) => write!(f, "Serialization error: {}", e),
            AppError::BadRequest(e) => write!(f, "Bad request: {}", e),
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
            AppError::ForbiddenEmail(e) => write!(f, "Forbidden email: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err)
    }
}

impl From<ForbiddenEmail> for AppError {
    fn from(err: ForbiddenEmail) -> Self {
        AppError::ForbiddenEmail(err)
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn is_forbidden_email(&self) -> bool {
        matches!(self, AppError::ForbiddenEmail(_))
    }

    pub fn to_response(&self) -> (StatusCode, Json<serde_json::Value>) {
        let (status, message) = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.clone())
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::BadRequest(e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.clone())
            }
            AppError::Configuration(e) => {
                tracing::error!("Configuration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.clone())
            }
            AppError::ForbiddenEmail(e) => {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({
                        "code": e.code(),
                        "message": e.message,
                    })),
                );
            }
        };

        (status, Json(json!({ "message": message })))
    }
}
