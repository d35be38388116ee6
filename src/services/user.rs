//! User registration and activation.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{
    ActivateUser, RegisterUser, Registration, User, UserResponse, SCOPE_ACTIVATION,
};
use crate::services::auth;
use crate::validation;

/// SHA-256 hex digest stored in place of a token's plaintext.
pub fn token_hash(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

/// Fresh 32-character token plaintext.
fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Register an account and issue its activation token.
///
/// There is no mailer: the plaintext token is returned to the caller.
pub async fn register(
    pool: &PgPool,
    input: &RegisterUser,
    activation_ttl_secs: i64,
) -> Result<Registration, AppError> {
    validation::validate(input)?;
    let password_hash = auth::hash_password(&input.password)?;

    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::field("email", "a user with this email address already exists")
        }
        _ => AppError::Database(e),
    })?;

    let plaintext = generate_token();
    let expiry = Utc::now() + Duration::seconds(activation_ttl_secs);
    sqlx::query("INSERT INTO tokens (hash, user_id, expiry, scope) VALUES ($1, $2, $3, $4)")
        .bind(token_hash(&plaintext))
        .bind(user.id)
        .bind(expiry)
        .bind(SCOPE_ACTIVATION)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id = user.id, "Registered user");
    Ok(Registration {
        user: UserResponse::from(user),
        activation_token: plaintext,
        activation_expiry: expiry,
    })
}

/// Activate the account an unexpired activation token belongs to.
pub async fn activate(pool: &PgPool, input: &ActivateUser) -> Result<UserResponse, AppError> {
    validation::validate(input)?;

    let mut tx = pool.begin().await?;

    let user_id = sqlx::query_scalar::<_, i64>(
        "SELECT user_id FROM tokens WHERE hash = $1 AND scope = $2 AND expiry > NOW()",
    )
    .bind(token_hash(&input.token))
    .bind(SCOPE_ACTIVATION)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::field("token", "invalid or expired activation token"))?;

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET activated = TRUE WHERE id = $1 RETURNING *",
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::EditConflict)?;

    sqlx::query("DELETE FROM tokens WHERE user_id = $1 AND scope = $2")
        .bind(user_id)
        .bind(SCOPE_ACTIVATION)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id, "Activated user");
    Ok(UserResponse::from(user))
}

/// Current activation flag of a user, `None` when the account is gone.
pub async fn is_activated(pool: &PgPool, id: i64) -> Result<Option<bool>, AppError> {
    let activated = sqlx::query_scalar::<_, bool>("SELECT activated FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(activated)
}
