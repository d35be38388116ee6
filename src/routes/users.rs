//! Account routes: registration and activation.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::errors::{AppError, Envelope};
use crate::middleware::extract::AppJson;
use crate::models::user::{ActivateUser, RegisterUser, UserResponse};
use crate::services::user as user_service;
use crate::AppState;

/// POST /v1/users: register; the activation token comes back in the body.
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterUser>,
) -> Result<impl IntoResponse, AppError> {
    let registration =
        user_service::register(&state.db, &body, state.config.activation_token_ttl_secs).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(Envelope::new("registration", registration)),
    ))
}

/// PUT /v1/users/activated
pub async fn activate(
    State(state): State<AppState>,
    AppJson(body): AppJson<ActivateUser>,
) -> Result<Json<Envelope<UserResponse>>, AppError> {
    let user = user_service::activate(&state.db, &body).await?;
    Ok(Envelope::success("user", user))
}
