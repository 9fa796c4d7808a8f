use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{IdentityVerifier, ObjectStorage};
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    link_rate_limit, metrics_handler, metrics_middleware, require_reviewer, require_session,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{admin, auth, bookings, health, trips, vehicles};
use crate::services::{HttpObjectStorage, LineIdentityVerifier};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Session token signing and validation keys.
    pub jwt: Arc<JwtConfig>,
    /// Verifies LINE ID tokens.
    pub identity: Arc<dyn IdentityVerifier>,
    /// Stores trip photos.
    pub storage: Arc<dyn ObjectStorage>,
    /// Per-client limit on identity-link attempts; `None` when disabled.
    pub link_limiter: Option<Arc<RateLimiterState>>,
}

/// Builds the application with the LINE and HTTP storage clients.
pub fn create_app(config: Config, pool: PgPool) -> anyhow::Result<Router> {
    let identity = Arc::new(LineIdentityVerifier::new(&config.line)?);
    let storage = Arc::new(HttpObjectStorage::new(&config.storage)?);
    create_app_with_services(config, pool, identity, storage)
}

/// Builds the application around the given collaborators.
pub fn create_app_with_services(
    config: Config,
    pool: PgPool,
    identity: Arc<dyn IdentityVerifier>,
    storage: Arc<dyn ObjectStorage>,
) -> anyhow::Result<Router> {
    let config = Arc::new(config);

    let jwt = JwtConfig::new(
        &config.jwt.private_key,
        &config.jwt.public_key,
        config.jwt.session_expiry_secs,
        config.jwt.leeway_secs,
    )?;

    let link_limiter = (config.security.link_rate_limit_per_minute > 0).then(|| {
        Arc::new(RateLimiterState::new(
            config.security.link_rate_limit_per_minute,
            config.security.trust_proxy_headers,
        ))
    });

    let state = AppState {
        pool,
        config: config.clone(),
        jwt: Arc::new(jwt),
        identity,
        storage,
        link_limiter,
    };

    let cors = if config.security.cors_origins.is_empty() {
        // Development: allow any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Identity routes (public; the ID token is the credential)
    let auth_routes = Router::new()
        .route("/api/v1/auth/line", post(auth::resolve_identity))
        .merge(
            Router::new()
                .route("/api/v1/auth/line/link", post(auth::link_identity))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    link_rate_limit,
                )),
        );

    // Employee routes (require a session)
    let employee_routes = Router::new()
        .route("/api/v1/me", get(auth::current_employee))
        .route("/api/v1/vehicles", get(vehicles::list_vehicles))
        .route("/api/v1/vehicles/available", get(vehicles::available_vehicles))
        .route("/api/v1/bookings", post(bookings::create_booking))
        .route("/api/v1/bookings/mine", get(bookings::list_my_bookings))
        .route("/api/v1/bookings/:booking_id", get(bookings::get_booking))
        .route(
            "/api/v1/bookings/:booking_id/cancel",
            post(bookings::cancel_booking),
        )
        .route(
            "/api/v1/bookings/:booking_id/trip",
            get(trips::get_trip_log),
        )
        .route(
            "/api/v1/bookings/:booking_id/trip/start",
            post(trips::start_trip),
        )
        .route("/api/v1/bookings/:booking_id/trip/end", post(trips::end_trip))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    // Reviewer routes (admins and approvers)
    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/bookings/pending",
            get(admin::list_pending_bookings),
        )
        .route(
            "/api/v1/admin/bookings/:booking_id/approve",
            post(admin::approve_booking),
        )
        .route(
            "/api/v1/admin/bookings/:booking_id/reject",
            post(admin::reject_booking),
        )
        // Role check runs after the session is resolved
        .route_layer(middleware::from_fn(require_reviewer))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Ok(Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(employee_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}
