use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_expiry_secs: i64,
    pub activation_token_ttl_secs: i64,
    pub cors_trusted_origins: Vec<String>,
    pub limiter: LimiterConfig,
    pub stats_tx_timeout: Duration,
}

/// Per-client rate limiter settings.
#[derive(Debug, Clone)]
pub struct LimiterConfig {
    pub enabled: bool,
    pub rps: u32,
    pub burst: u32,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rps: 2,
            burst: 4,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("BACKEND_PORT", 4000),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiry_secs: parse_or("JWT_EXPIRY_SECS", 86_400),
            activation_token_ttl_secs: parse_or("ACTIVATION_TOKEN_TTL_SECS", 259_200),
            cors_trusted_origins: env::var("CORS_TRUSTED_ORIGINS")
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            limiter: LimiterConfig {
                enabled: parse_or("LIMITER_ENABLED", true),
                rps: parse_or("LIMITER_RPS", 2),
                burst: parse_or("LIMITER_BURST", 4),
            },
            stats_tx_timeout: Duration::from_secs(parse_or("STATS_TX_TIMEOUT_SECS", 3)),
        })
    }
}

/// Read and parse an optional variable, falling back to `default` when unset or malformed.
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
