//! # Streaming API
//!
//! Push transports over [`StreamingDeliverer`](crate::application::services::StreamingDeliverer)
//! sessions. Both read the route from the path and the date from the query
//! string, and both end after the first error frame or when the peer goes
//! away.
//!
//! - [`sse`]: `GET /sse/{origin}/{destination}?date=`
//! - [`ws`]: `GET /ws/{origin}/{destination}?date=`

pub mod sse;
pub mod ws;

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::value_objects::SearchQuery;
use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use serde::Deserialize;

/// Query string of the streaming routes.
#[derive(Debug, Default, Deserialize)]
pub struct StreamParams {
    /// Departure date.
    pub date: Option<String>,
}

/// Builds the session query from path segments and the `date` parameter.
///
/// # Errors
///
/// Returns `Validation` when `date` is missing and `Domain` for malformed
/// airport codes.
pub fn stream_query(
    origin: &str,
    destination: &str,
    params: Result<Query<StreamParams>, QueryRejection>,
) -> ApplicationResult<SearchQuery> {
    let Query(params) = params.map_err(|e| ApplicationError::validation(e.body_text()))?;
    let date = params
        .date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApplicationError::validation("date is required"))?;
    Ok(SearchQuery::parse(origin, destination, &date)?)
}
