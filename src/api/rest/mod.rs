//! # REST API
//!
//! One-shot endpoints using axum.
//!
//! # Endpoints
//!
//! ## Public
//! - `GET /health` - Liveness and registered providers
//! - `POST /auth/login` - Exchange credentials for a bearer token
//!
//! ## Authenticated
//! - `GET /flights/search?origin=&destination=&date=` - Aggregated offers
//! - `GET /flights/history?origin=&destination=[&months=]` - Monthly averages
//! - `GET /sse/{origin}/{destination}?date=` - Server-Sent Events stream
//! - `GET /ws/{origin}/{destination}?date=` - WebSocket stream
//!
//! # Usage
//!
//! ```ignore
//! use flight_aggregator::api::rest::{create_router, AppState};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new(engine, config.search.stream_interval(), auth));
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    AppState, ErrorResponse, HealthResponse, HistoryParams, SearchParams, SearchResponse,
};
pub use routes::create_router;
