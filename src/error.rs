//! Error types for the Bookhive server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Main application error type.
///
/// Services fail by returning one of these; the boundary layer is the only
/// place they are translated to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Business rule violation (duplicate username, duplicate shelf name,
    /// foreign shelf access, ...). Maps to 400; the one 409 case is
    /// `Conflict` (author deletion with assigned books).
    #[error("Business rule violation: {0}")]
    Business(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body: `{error, message}`
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

fn body(error: &str, message: String) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: error.to_string(),
        message,
    })
}

/// Flatten validator output into a per-field `{field: message}` map.
pub fn validation_field_map(errors: &validator::ValidationErrors) -> HashMap<String, String> {
    errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "invalid value".to_string());
            (field.to_string(), message)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, body("Unauthorized", msg.clone())).into_response()
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, body("Forbidden", msg.clone())).into_response()
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, body("Not Found", msg.clone())).into_response()
            }
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(validation_field_map(errors))).into_response()
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, body("Conflict", msg.clone())).into_response()
            }
            AppError::Business(msg) => {
                (StatusCode::BAD_REQUEST, body("Bad Request", msg.clone())).into_response()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("Internal Server Error", "Database error".to_string()),
                )
                    .into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("Internal Server Error", "Internal server error".to_string()),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
    }

    #[test]
    fn validation_errors_flatten_to_field_map() {
        let err = Probe {
            name: "ab".to_string(),
        }
        .validate()
        .unwrap_err();

        let map = validation_field_map(&err);
        assert_eq!(map.get("name").map(String::as_str), Some("too short"));
    }
}
