//! # Streaming Deliverer
//!
//! Periodic push of search results to one long-lived client connection.
//!
//! [`StreamingDeliverer::subscribe`] spawns a session task that searches
//! immediately, then again on every interval tick, writing each outcome to a
//! bounded channel. The transport (SSE or WebSocket) drains the receiver.
//!
//! A session ends when:
//! - a search fails: one [`StreamFrame::Error`] is sent first
//! - the receiver is dropped: checked while waiting for the tick, while a
//!   search is in flight, and while a frame is waiting for channel capacity.
//!   An in-flight search is dropped, which aborts its provider tasks.

use crate::application::services::offer_aggregation::OfferAggregationEngine;
use crate::application::services::ranking::AggregationResult;
use crate::domain::value_objects::SearchQuery;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

/// Frames buffered per connection before the session waits on the client.
pub const FRAME_BUFFER: usize = 4;

/// One message pushed to a streaming client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Fresh (or cached) search result.
    Update(Arc<AggregationResult>),
    /// The search failed; no further frames follow.
    Error {
        /// Failure description.
        message: String,
    },
}

/// Spawns one push session per subscribing connection.
#[derive(Debug, Clone)]
pub struct StreamingDeliverer {
    engine: Arc<OfferAggregationEngine>,
    interval: Duration,
}

impl StreamingDeliverer {
    /// Creates a deliverer pushing every `interval`.
    #[must_use]
    pub fn new(engine: Arc<OfferAggregationEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Starts a session for `query` and returns its frame stream.
    ///
    /// Dropping the receiver ends the session.
    #[must_use]
    pub fn subscribe(&self, query: SearchQuery) -> mpsc::Receiver<StreamFrame> {
        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        let session = Uuid::new_v4();
        let span = info_span!("stream_session", %session, query = %query);
        tokio::spawn(
            run_session(Arc::clone(&self.engine), query, self.interval, tx).instrument(span),
        );
        rx
    }
}

async fn run_session(
    engine: Arc<OfferAggregationEngine>,
    query: SearchQuery,
    every: Duration,
    tx: mpsc::Sender<StreamFrame>,
) {
    info!(interval_ms = every.as_millis() as u64, "Streaming session started");

    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut pushed = 0_u64;

    let reason = loop {
        tokio::select! {
            biased;
            () = tx.closed() => break "client disconnected",
            _ = ticker.tick() => {}
        }

        let outcome = tokio::select! {
            biased;
            () = tx.closed() => break "client disconnected",
            outcome = engine.search(&query) => outcome,
        };

        let (frame, last) = match outcome {
            Ok(result) => (StreamFrame::Update(result), false),
            Err(error) => (
                StreamFrame::Error {
                    message: error.to_string(),
                },
                true,
            ),
        };

        tokio::select! {
            biased;
            () = tx.closed() => break "client disconnected",
            sent = tx.send(frame) => {
                if sent.is_err() {
                    break "client disconnected";
                }
            }
        }
        pushed += 1;

        if last {
            break "search failed";
        }
    };

    info!(reason, frames = pushed, "Streaming session stopped");
}
