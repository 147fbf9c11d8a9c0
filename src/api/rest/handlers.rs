//! # REST Handlers
//!
//! Shared state, response bodies and request handlers for the one-shot
//! endpoints. Errors leave every handler as [`ApplicationError`], which
//! renders itself as an [`ErrorResponse`].

use crate::api::auth::JwtAuth;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::{
    AggregationResult, OfferAggregationEngine, StreamingDeliverer,
};
use crate::domain::entities::FlightOffer;
use crate::domain::services::history::{DEFAULT_MONTHS, HistoryService, MAX_MONTHS, MonthPoint};
use crate::domain::value_objects::{AirportCode, SearchQuery};
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Aggregation engine backing one-shot and streaming searches.
    pub engine: Arc<OfferAggregationEngine>,
    /// Spawns streaming sessions.
    pub deliverer: StreamingDeliverer,
    /// Synthetic price history.
    pub history: HistoryService,
    /// Token issuer and verifier.
    pub auth: Arc<JwtAuth>,
}

impl AppState {
    /// Builds state around an engine, pushing stream updates every
    /// `stream_interval`.
    #[must_use]
    pub fn new(
        engine: Arc<OfferAggregationEngine>,
        stream_interval: std::time::Duration,
        auth: JwtAuth,
    ) -> Self {
        Self {
            deliverer: StreamingDeliverer::new(Arc::clone(&engine), stream_interval),
            engine,
            history: HistoryService::new(),
            auth: Arc::new(auth),
        }
    }
}

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ApplicationError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Domain(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Aggregation(_) => StatusCode::BAD_GATEWAY,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed");
        } else if status == StatusCode::BAD_GATEWAY {
            warn!(code = self.code(), error = %self, "Search failed");
        }
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Health body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Registered providers in registration order.
    pub providers: Vec<String>,
}

/// Query string of `GET /flights/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Origin airport code.
    pub origin: Option<String>,
    /// Destination airport code.
    pub destination: Option<String>,
    /// Departure date.
    pub date: Option<String>,
}

/// Body of a successful search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Normalized origin.
    pub origin: String,
    /// Normalized destination.
    pub destination: String,
    /// Departure date as given.
    pub date: String,
    /// Cheapest offer.
    pub cheapest: FlightOffer,
    /// Fastest offer.
    pub fastest: FlightOffer,
    /// Every offer, ranked.
    pub offers: Vec<FlightOffer>,
}

impl SearchResponse {
    /// Pairs a result with the normalized query that produced it.
    #[must_use]
    pub fn new(query: &SearchQuery, result: &AggregationResult) -> Self {
        Self {
            origin: query.origin().to_string(),
            destination: query.destination().to_string(),
            date: query.date().to_string(),
            cheapest: result.cheapest.clone(),
            fastest: result.fastest.clone(),
            offers: result.all.clone(),
        }
    }
}

/// Query string of `GET /flights/history`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    /// Origin airport code.
    pub origin: Option<String>,
    /// Destination airport code.
    pub destination: Option<String>,
    /// Series length, 1 to 120.
    pub months: Option<u32>,
}

fn required<'a>(value: Option<&'a str>, name: &str) -> ApplicationResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApplicationError::validation(format!("{name} is required")))
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> ApplicationResult<T> {
    params
        .map(|Query(p)| p)
        .map_err(|e| ApplicationError::validation(e.body_text()))
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        providers: state
            .engine
            .provider_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// `GET /flights/search?origin=&destination=&date=`
///
/// # Errors
///
/// Returns `Validation`/`Domain` for missing or malformed parameters and
/// `Aggregation` when the search fails.
pub async fn search_flights(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApplicationResult<Json<SearchResponse>> {
    let params = query_params(params)?;
    let query = SearchQuery::parse(
        required(params.origin.as_deref(), "origin")?,
        required(params.destination.as_deref(), "destination")?,
        required(params.date.as_deref(), "date")?,
    )?;

    let result = state.engine.search(&query).await?;
    Ok(Json(SearchResponse::new(&query, &result)))
}

/// `GET /flights/history?origin=&destination=[&months=]`
///
/// # Errors
///
/// Returns `Validation`/`Domain` for missing codes or `months` outside
/// `1..=120`.
pub async fn price_history(
    State(state): State<Arc<AppState>>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> ApplicationResult<Json<Vec<MonthPoint>>> {
    let params = query_params(params)?;
    let origin = AirportCode::new(required(params.origin.as_deref(), "origin")?)?;
    let destination = AirportCode::new(required(params.destination.as_deref(), "destination")?)?;
    let months = params.months.unwrap_or(DEFAULT_MONTHS);
    if !(1..=MAX_MONTHS).contains(&months) {
        return Err(ApplicationError::validation(format!(
            "months must be between 1 and {MAX_MONTHS}"
        )));
    }

    let series = state
        .history
        .monthly_averages_now(&origin, &destination, months)?;
    Ok(Json(series))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::services::AggregationError;
    use crate::domain::errors::DomainError;

    mod status {
        use super::*;

        #[test]
        fn client_errors() {
            assert_eq!(
                ApplicationError::validation("x").status(),
                StatusCode::BAD_REQUEST
            );
            assert_eq!(
                ApplicationError::from(DomainError::EmptyDate).status(),
                StatusCode::BAD_REQUEST
            );
            assert_eq!(
                ApplicationError::unauthorized("x").status(),
                StatusCode::UNAUTHORIZED
            );
        }

        #[test]
        fn aggregation_is_bad_gateway() {
            assert_eq!(
                ApplicationError::from(AggregationError::NoOffers).status(),
                StatusCode::BAD_GATEWAY
            );
            assert_eq!(
                ApplicationError::from(AggregationError::DeadlineExceeded { timeout_ms: 10 })
                    .status(),
                StatusCode::BAD_GATEWAY
            );
        }

        #[test]
        fn internal_is_server_error() {
            assert_eq!(
                ApplicationError::internal("x").status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    mod params {
        use super::*;

        #[test]
        fn required_trims_and_rejects_blank() {
            assert_eq!(required(Some(" ams "), "origin").unwrap(), "ams");
            let err = required(Some("  "), "origin").unwrap_err();
            assert_eq!(err.to_string(), "origin is required");
            assert!(required(None, "date").is_err());
        }
    }
}
