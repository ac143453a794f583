//! API routes

pub mod auth;
pub mod health;
pub mod query;
pub mod tools;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth::require_auth, error::expose_error_detail, state::AppState};

/// Request bodies are small JSON documents
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth_state();

    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/tools", get(tools::list_tools));

    // Protected routes (auth required). `route_layer` so unmatched paths
    // still 404 instead of 401.
    let protected_routes = Router::new()
        .route("/users", get(users::list_users))
        .route(
            "/users/me",
            get(users::read_me)
                .patch(users::update_me)
                .put(users::update_me)
                .delete(users::delete_me),
        )
        .route("/query", post(query::process_query))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    let mut router = Router::new()
        .merge(health_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    expose_error_detail,
                )),
        );

    if let Some(cors) = cors_layer(&state.config.cors_allowed_origins) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

/// CORS for the configured origins; `None` when no origin is configured
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}
