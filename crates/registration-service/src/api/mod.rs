//! HTTP API for the registration service.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{logging_middleware, rate_limit_middleware, RateLimitState};
pub use types::*;

use crate::coordinator::RegistrationCoordinator;
use crate::sessions::SessionTable;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use user_store::UserStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<RegistrationCoordinator>,
    /// Live registration sessions
    pub sessions: SessionTable,
    /// User records, for health reporting
    pub store: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(
        coordinator: RegistrationCoordinator,
        sessions: SessionTable,
        store: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            sessions,
            store,
        }
    }
}

/// Create the API router with the default rate limit.
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, RateLimitState::new(60))
}

/// Create the API router with a custom rate limit.
///
/// `/health` is not rate limited.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .route("/v1/sessions", post(handlers::create_session))
        .route(
            "/v1/sessions/:id",
            get(handlers::get_session).delete(handlers::reset_session),
        )
        .route(
            "/v1/sessions/:id/registration",
            post(handlers::start_registration),
        )
        .route(
            "/v1/sessions/:id/registration/verify",
            post(handlers::verify_registration),
        )
        .route(
            "/v1/sessions/:id/registration/retry",
            post(handlers::retry_registration),
        )
        .route("/v1/sessions/:id/login", post(handlers::login))
        .route("/v1/sessions/:id/logout", post(handlers::logout))
        .route("/v1/format/phone", get(handlers::format_phone))
        .route("/v1/format/cpf", get(handlers::format_national_id))
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ))
        .route("/health", get(handlers::health))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
