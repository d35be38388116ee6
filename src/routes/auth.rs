//! Authentication routes.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::errors::{AppError, Envelope};
use crate::middleware::extract::AppJson;
use crate::models::user::CreateAuthToken;
use crate::services::auth as auth_service;
use crate::AppState;

/// POST /v1/tokens/authentication: exchange credentials for a bearer token.
pub async fn create_authentication_token(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateAuthToken>,
) -> Result<impl IntoResponse, AppError> {
    let token = auth_service::authenticate(
        &state.db,
        &body,
        &state.config.jwt_secret,
        state.config.jwt_expiry_secs,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("authentication_token", token)),
    ))
}
