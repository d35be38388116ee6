//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub environment: String,
    pub version: &'static str,
    pub database: String,
}

/// GET /v1/healthcheck: always 200 while the process serves requests.
pub async fn check(State(state): State<AppState>) -> Json<HealthStatus> {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "unavailable".to_string()
        }
    };

    Json(HealthStatus {
        status: "available",
        environment: state.config.environment.clone(),
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
