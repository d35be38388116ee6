//! Bearer-token extractors for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::errors::AppError;
use crate::services::{auth as auth_service, user as user_service};
use crate::AppState;

/// Authenticated user extracted from the `Authorization: Bearer` token.
///
/// ```ignore
/// async fn handler(current_user: CurrentUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    /// Activation state when the token was issued.
    pub activated: bool,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        let claims = auth_service::validate_token(bearer.token(), &state.config.jwt_secret)?;
        let id: i64 = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;

        Ok(CurrentUser {
            id,
            activated: claims.activated,
        })
    }
}

/// Extractor that requires an activated account.
///
/// Tokens issued before activation are re-checked against the database, so
/// activating does not force a fresh login.
#[derive(Debug, Clone)]
pub struct RequireActivatedUser(pub CurrentUser);

impl FromRequestParts<AppState> for RequireActivatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.activated {
            return Ok(RequireActivatedUser(user));
        }

        match user_service::is_activated(&state.db, user.id).await? {
            Some(true) => Ok(RequireActivatedUser(CurrentUser {
                activated: true,
                ..user
            })),
            Some(false) => Err(AppError::InactiveAccount),
            None => Err(AppError::Unauthorized),
        }
    }
}
