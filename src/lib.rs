pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod validation;

use sqlx::PgPool;

use crate::middleware::rate_limit::ClientLimiter;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: config::AppConfig,
    /// `None` when rate limiting is disabled.
    pub limiter: Option<ClientLimiter>,
}

impl AppState {
    pub fn new(db: PgPool, config: config::AppConfig) -> Self {
        let limiter = ClientLimiter::from_config(&config.limiter);
        Self {
            db,
            config,
            limiter,
        }
    }
}
