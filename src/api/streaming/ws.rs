//! # WebSocket
//!
//! Each update is a text frame holding the aggregation result as JSON. A
//! failed search sends `{"error": message}` and closes the socket.
//! Messages from the client are ignored apart from close frames.

use super::{StreamParams, stream_query};
use crate::api::rest::handlers::AppState;
use crate::application::error::ApplicationResult;
use crate::application::services::{StreamFrame, StreamingDeliverer};
use crate::domain::value_objects::SearchQuery;
use axum::extract::rejection::QueryRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use std::sync::Arc;
use tracing::debug;

/// `GET /ws/{origin}/{destination}?date=`
///
/// # Errors
///
/// Rejects the upgrade if the route or date is invalid.
pub async fn subscribe(
    upgrade: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path((origin, destination)): Path<(String, String)>,
    params: Result<Query<StreamParams>, QueryRejection>,
) -> ApplicationResult<Response> {
    let query = stream_query(&origin, &destination, params)?;
    let deliverer = state.deliverer.clone();
    Ok(upgrade.on_upgrade(move |socket| session(socket, deliverer, query)))
}

/// Encodes one frame as text; the flag is true for the final frame.
#[must_use]
pub fn encode_frame(frame: &StreamFrame) -> (String, bool) {
    let error = |message: &str| serde_json::json!({ "error": message }).to_string();
    match frame {
        StreamFrame::Update(result) => match serde_json::to_string(result.as_ref()) {
            Ok(text) => (text, false),
            Err(e) => (error(&e.to_string()), true),
        },
        StreamFrame::Error { message } => (error(message), true),
    }
}

async fn session(mut socket: WebSocket, deliverer: StreamingDeliverer, query: SearchQuery) {
    let mut frames = deliverer.subscribe(query);

    loop {
        tokio::select! {
            frame = frames.recv() => {
                let Some(frame) = frame else { break };
                let (text, last) = encode_frame(&frame);
                if socket.send(Message::Text(text.into())).await.is_err() {
                    debug!("WebSocket send failed");
                    break;
                }
                if last {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    drop(frames);
    let _ = socket.send(Message::Close(None)).await;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::services::AggregationResult;
    use crate::domain::entities::FlightOffer;
    use crate::domain::value_objects::{CurrencyCode, Price, ProviderId, Timestamp};

    fn result() -> Arc<AggregationResult> {
        let offer = FlightOffer::scheduled(
            ProviderId::new("p"),
            Price::parse("99.5").unwrap(),
            CurrencyCode::eur(),
            80,
            Timestamp::from_secs(1_759_305_600).unwrap(),
        );
        Arc::new(AggregationResult::rank(vec![offer]).unwrap())
    }

    #[test]
    fn update_frame_is_result_json() {
        let (text, last) = encode_frame(&StreamFrame::Update(result()));
        assert!(!last);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["cheapest"]["provider"], "p");
        assert_eq!(value["all"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn error_frame_is_last() {
        let (text, last) = encode_frame(&StreamFrame::Error {
            message: "no offers found".to_string(),
        });
        assert!(last);
        assert_eq!(text, r#"{"error":"no offers found"}"#);
    }
}
