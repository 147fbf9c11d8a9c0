//! # Server-Sent Events
//!
//! Each update is an `update` event carrying the aggregation result as JSON;
//! a failed search produces one `error` event whose data is the message,
//! after which the stream ends.

use super::{StreamParams, stream_query};
use crate::api::rest::handlers::AppState;
use crate::application::error::ApplicationResult;
use crate::application::services::StreamFrame;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

/// `GET /sse/{origin}/{destination}?date=`
///
/// # Errors
///
/// Rejects the request before streaming starts if the route or date is
/// invalid.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Path((origin, destination)): Path<(String, String)>,
    params: Result<Query<StreamParams>, QueryRejection>,
) -> ApplicationResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let query = stream_query(&origin, &destination, params)?;
    let frames = ReceiverStream::new(state.deliverer.subscribe(query));
    let events = frames.map(|frame| Ok::<_, Infallible>(to_event(frame)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Encodes one frame as an SSE event.
#[must_use]
pub fn to_event(frame: StreamFrame) -> Event {
    match frame {
        StreamFrame::Update(result) => Event::default()
            .event("update")
            .json_data(result.as_ref())
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string())),
        StreamFrame::Error { message } => Event::default().event("error").data(message),
    }
}
