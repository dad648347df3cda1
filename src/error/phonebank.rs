use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error as ThisError;
use tracing::error;

/// Message shown to anyone who fails an authorization check.
pub const UNAUTHORIZED_MESSAGE: &str = "Sorry! The user isn't authorized.";

#[derive(Debug, ThisError)]
pub enum PhonebankError {
    /// No identity, or an identity that is not on the caller whitelist.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but not a site admin.
    #[error("Forbidden")]
    Forbidden,

    #[error("Validation error: {0}")]
    Validation(String),

    /// A row of an uploaded batch is not an integer; the whole batch is rejected.
    #[error("Malformed phone number {token:?} at row {row}")]
    MalformedNumber { row: usize, token: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl PhonebankError {
    pub fn status(&self) -> StatusCode {
        match self {
            PhonebankError::Unauthorized => StatusCode::UNAUTHORIZED,
            PhonebankError::Forbidden => StatusCode::FORBIDDEN,
            PhonebankError::Validation(_) | PhonebankError::MalformedNumber { .. } => {
                StatusCode::BAD_REQUEST
            }
            PhonebankError::NotFound(_) => StatusCode::NOT_FOUND,
            PhonebankError::RactorError(_) | PhonebankError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PhonebankError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed with internal error");
        }
        let error_body = match self {
            PhonebankError::DatabaseError(_) | PhonebankError::RactorError(_) => ApiErrorObject {
                code: "INTERNAL_ERROR".to_string(),
                message: "An internal server error occurred.".to_string(),
                details: None,
            },

            PhonebankError::Unauthorized => ApiErrorObject {
                code: "UNAUTHORIZED".to_string(),
                message: UNAUTHORIZED_MESSAGE.to_string(),
                details: None,
            },

            PhonebankError::Forbidden => ApiErrorObject {
                code: "FORBIDDEN".to_string(),
                message: UNAUTHORIZED_MESSAGE.to_string(),
                details: None,
            },

            PhonebankError::Validation(message) => ApiErrorObject {
                code: "INVALID_REQUEST".to_string(),
                message,
                details: None,
            },

            PhonebankError::MalformedNumber { row, token } => ApiErrorObject {
                code: "MALFORMED_PHONE_NUMBER".to_string(),
                message: format!("Row {row} is not a phone number; nothing was imported."),
                details: Some(json!({ "row": row, "token": token })),
            },

            PhonebankError::NotFound(message) => ApiErrorObject {
                code: "NOT_FOUND".to_string(),
                message,
                details: None,
            },
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
