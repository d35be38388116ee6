//! Authentication service: password hashing, bearer tokens, and credential checks.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::user::{AuthenticationToken, CreateAuthToken, User};
use crate::validation;

/// JWT claims embedded in authentication tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub activated: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Sign an HS256 token for `user` valid for `expiry_secs`.
pub fn issue_token(
    user: &User,
    jwt_secret: &str,
    expiry_secs: i64,
) -> Result<AuthenticationToken, AppError> {
    let now = Utc::now();
    let expiry = now + Duration::seconds(expiry_secs);
    let claims = Claims {
        sub: user.id.to_string(),
        activated: user.activated,
        exp: expiry.timestamp(),
        iat: now.timestamp(),
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    Ok(AuthenticationToken { token, expiry })
}

/// Validate a JWT and return the claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    jsonwebtoken::decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

/// Exchange email and password for a bearer token.
pub async fn authenticate(
    pool: &PgPool,
    input: &CreateAuthToken,
    jwt_secret: &str,
    expiry_secs: i64,
) -> Result<AuthenticationToken, AppError> {
    validation::validate(input)?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
        .bind(&input.email)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&input.password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "Rejected authentication attempt");
        return Err(AppError::Unauthorized);
    }

    tracing::info!(user_id = user.id, "Issued authentication token");
    issue_token(&user, jwt_secret, expiry_secs)
}
