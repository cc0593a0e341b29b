//! HTTP handlers for registration and login. Both answer with a token
//! envelope on success.

use crate::{
    errors::AppError,
    models::{account::LoginBody, student::StudentBody},
    services::auth_service::{AuthService, TokenEnvelope},
    state::AppState,
};
use axum::{Json, extract::State};

/// POST `/user/register` — create the student row, provision credentials
/// for it, and sign the caller in.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<StudentBody>,
) -> Result<Json<TokenEnvelope>, AppError> {
    body.validate_with_credentials()
        .map_err(AppError::validation)?;

    let student = state.parking.create_student(&body).await?;

    // Validation guarantees the password is present here.
    let password = body.password.as_deref().unwrap_or_default();
    let account = state
        .auth
        .create_account(student.id, &student.email, password)
        .await?;

    Ok(Json(state.auth.issue_token(&account)?))
}

/// POST `/user/login` — verify credentials and issue a fresh token.
pub async fn login(
    State(auth): State<AuthService>,
    Json(body): Json<LoginBody>,
) -> Result<Json<TokenEnvelope>, AppError> {
    body.validate().map_err(AppError::validation)?;

    let account = auth.authenticate(&body.email, &body.password).await?;

    Ok(Json(auth.issue_token(&account)?))
}
