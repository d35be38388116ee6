//! Per-client-IP rate limiting.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::config::LimiterConfig;
use crate::errors::AppError;
use crate::AppState;

/// Token buckets keyed by client IP.
#[derive(Clone)]
pub struct ClientLimiter {
    buckets: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl std::fmt::Debug for ClientLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientLimiter")
            .field("clients", &self.buckets.len())
            .finish()
    }
}

impl ClientLimiter {
    /// `None` when limiting is switched off.
    pub fn from_config(config: &LimiterConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let rps = NonZeroU32::new(config.rps).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst).unwrap_or(rps);
        let quota = Quota::per_second(rps).allow_burst(burst);
        Some(Self {
            buckets: Arc::new(RateLimiter::keyed(quota)),
        })
    }

    pub fn check(&self, ip: IpAddr) -> bool {
        self.buckets.check_key(&ip).is_ok()
    }

    /// Forget clients whose buckets are full again.
    pub fn prune(&self) {
        self.buckets.retain_recent();
    }
}

/// Client address from the connection, then `X-Forwarded-For`.
pub fn client_ip(request: &Request) -> IpAddr {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Reject the request with 429 once its client has spent its burst.
pub async fn limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(limiter) = &state.limiter {
        let ip = client_ip(&request);
        if !limiter.check(ip) {
            tracing::debug!(client = %ip, "Rate limit exceeded");
            return AppError::RateLimited.into_response();
        }
    }
    next.run(request).await
}
