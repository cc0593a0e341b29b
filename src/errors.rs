use crate::services::{auth_service::AuthError, parking_service::ParkingError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::{collections::BTreeMap, fmt};

/// Per-field validation errors, keyed by the JSON field name.
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub field_errors: Option<FieldErrors>,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            field_errors: None,
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 401 Unauthorized
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    /// A 400 carrying the per-field error map produced by payload validation.
    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "One or more validation errors occurred.".into(),
            field_errors: Some(errors),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self.field_errors {
            Some(errors) => Json(json!({
                "message": self.message,
                "status": self.status.as_u16(),
                "errors": errors,
            })),
            None => Json(json!({
                "error": self.message,
                "status": self.status.as_u16()
            })),
        };

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<ParkingError> for AppError {
    fn from(err: ParkingError) -> Self {
        match err {
            ParkingError::RegionNotFound(_)
            | ParkingError::SpotNotFound(_)
            | ParkingError::StudentNotFound(_)
            | ParkingError::NoSpotAssigned(_) => AppError::not_found(err.to_string()),
            ParkingError::SaveFailed => {
                AppError::bad_request("There was a problem saving the record")
            }
            ParkingError::Sqlx(e) => AppError::internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailTaken(_) | AuthError::InvalidCredentials => {
                AppError::bad_request(err.to_string())
            }
            AuthError::AccountNotFound(_) => AppError::not_found(err.to_string()),
            AuthError::Hash(e) => AppError::internal(e),
            AuthError::Token(e) => AppError::internal(e.to_string()),
            AuthError::Sqlx(e) => AppError::internal(e.to_string()),
        }
    }
}
