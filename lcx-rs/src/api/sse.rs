//! Server-Sent Events (SSE) for new submissions

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /api/events - SSE event stream
///
/// Streams:
/// - ConnectionStatus (once, on connect)
/// - ResponseSubmitted (after every stored submission)
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    lcx_common::sse::create_event_sse_stream("lcx-rs", &state.events)
}
