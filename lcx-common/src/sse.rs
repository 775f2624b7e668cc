//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE implementations for LCX services.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use crate::events::{EventBus, LcxEvent};

/// Keep-alive interval for every SSE stream
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Convert an event to an SSE frame; `None` if it cannot be serialized
pub fn to_sse_event(event: &LcxEvent) -> Option<Event> {
    match Event::default().event(event.event_type()).json_data(event) {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!("SSE: failed to serialize {}: {}", event.event_type(), e);
            None
        }
    }
}

/// Stream every bus event to one SSE client
///
/// Starts with a `ConnectionStatus: connected` frame. A client that falls
/// behind the bus capacity skips the lost events and keeps streaming.
pub fn create_event_sse_stream(
    service_name: &'static str,
    bus: &EventBus,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(
        "New SSE client connected to {} ({} subscribers)",
        service_name,
        bus.subscriber_count() + 1
    );

    let connected = futures::stream::once(async {
        Ok::<_, Infallible>(Event::default().event("ConnectionStatus").data("connected"))
    });

    let events = BroadcastStream::new(bus.subscribe()).filter_map(|result| async move {
        match result {
            Ok(event) => {
                debug!("SSE: forwarding {}", event.event_type());
                to_sse_event(&event).map(Ok)
            }
            Err(e) => {
                warn!("SSE client lagged: {:?}", e);
                None
            }
        }
    });

    Sse::new(connected.chain(events)).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
