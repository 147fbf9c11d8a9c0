//! # Routes
//!
//! Router assembly: public routes, the authenticated group, and the
//! tracing and CORS layers wrapped around both.

use super::handlers::{AppState, health, price_history, search_flights};
use crate::api::auth::{login, require_auth};
use crate::api::streaming::{sse, ws};
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/flights/search", get(search_flights))
        .route("/flights/history", get(price_history))
        .route("/sse/{origin}/{destination}", get(sse::subscribe))
        .route("/ws/{origin}/{destination}", get(ws::subscribe))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
