//! Rate limiting middleware.
//!
//! Limits identity-link attempts per client address so employee codes
//! cannot be enumerated quickly.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use serde_json::json;
use std::{
    net::SocketAddr,
    num::NonZeroU32,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::app::AppState;

/// Checks between sweeps of idle client entries.
const PRUNE_EVERY: u64 = 1024;

/// Rate limiter state shared across all requests, keyed by client address.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<String>,
    rate_limit_per_minute: u32,
    trust_proxy_headers: bool,
    checks: AtomicU64,
}

impl RateLimiterState {
    /// Create a limiter allowing `rate_limit_per_minute` attempts per client.
    ///
    /// With `trust_proxy_headers` the client is taken from `X-Forwarded-For`
    /// or `X-Real-IP`; otherwise only the connection peer counts.
    pub fn new(rate_limit_per_minute: u32, trust_proxy_headers: bool) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(rate_limit_per_minute).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::keyed(quota),
            rate_limit_per_minute,
            trust_proxy_headers,
            checks: AtomicU64::new(0),
        }
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Resolves the limiter key for a request.
    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        client_key(headers, peer, self.trust_proxy_headers)
    }

    /// Check if a request from the given client should be allowed.
    /// Returns Ok(()) if allowed, or Err with retry_after seconds if rate limited.
    pub fn check(&self, client: &str) -> Result<(), u64> {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }

        match self.limiter.check_key(&client.to_string()) {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(DefaultClock::default().now());
                Err(wait_time.as_secs().max(1))
            }
        }
    }

    /// Drops clients whose quota has fully replenished.
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        tracing::debug!(
            before = before,
            after = self.limiter.len(),
            "Pruned idle rate limit entries"
        );
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

/// Resolves the client address of a request.
///
/// Proxy headers are only read when the deployment sits behind a proxy that
/// sets them: the first `X-Forwarded-For` hop wins, then `X-Real-IP`. The
/// connection peer is used otherwise.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let proxied = trust_proxy
        .then(|| {
            let forwarded = headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());

            let real_ip = headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty());

            forwarded.or(real_ip).map(str::to_string)
        })
        .flatten();

    proxied
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware that applies the identity-link rate limit per client.
pub async fn link_rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(ref limiter) = state.link_limiter else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client = limiter.client_key(req.headers(), peer);

    if let Err(retry_after) = limiter.check(&client) {
        tracing::warn!(client = %client, retry_after = retry_after, "Identity link rate limited");
        metrics::counter!("rate_limited_requests_total", "route" => "auth_link").increment(1);
        return rate_limited_response(limiter.rate_limit_per_minute(), retry_after);
    }

    next.run(req).await
}

/// Create a rate limited response with proper headers and body.
fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": "rate_limited",
        "message": format!("Rate limit of {} requests/minute exceeded", limit),
        "retryAfter": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));

    response
}
