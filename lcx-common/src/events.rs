//! Event types for the LCX event system
//!
//! Provides the shared event enum and an in-process EventBus. The response
//! store emits on every write; SSE clients subscribe to hear about new
//! submissions without waiting for their next poll.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// LCX event types
///
/// Serialized with a `type` tag for SSE transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LcxEvent {
    /// A submission passed validation and was stored
    ResponseSubmitted {
        /// Store-assigned id
        id: i64,
        /// Attendee name, for live toasts
        name: String,
        /// Sector wire code
        sector: String,
        /// When the record was stored
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl LcxEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &str {
        match self {
            LcxEvent::ResponseSubmitted { .. } => "ResponseSubmitted",
        }
    }
}

/// Broadcast bus for [`LcxEvent`]
///
/// Cloning shares the same channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LcxEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<LcxEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: LcxEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
