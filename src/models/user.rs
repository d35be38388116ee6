//! User accounts and the single-use tokens issued to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::validation::not_blank;

/// Token scopes stored in the `tokens` table.
pub const SCOPE_ACTIVATION: &str = "activation";

/// Full user row from database (includes password_hash, never serialized to the API).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub activated: bool,
}

/// User response DTO, excludes password_hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub activated: bool,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            created_at: u.created_at,
            name: u.name,
            email: u.email,
            activated: u.activated,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 500, message = "must not be more than 500 bytes long")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 bytes long"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActivateUser {
    #[serde(default)]
    #[validate(length(equal = 32, message = "must be 32 characters long"))]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAuthToken {
    #[serde(default)]
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 bytes long"))]
    pub password: String,
}

/// Registration result: the new account plus the plaintext activation token.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user: UserResponse,
    pub activation_token: String,
    pub activation_expiry: DateTime<Utc>,
}

/// Bearer token handed out by `POST /v1/tokens/authentication`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticationToken {
    pub token: String,
    pub expiry: DateTime<Utc>,
}
