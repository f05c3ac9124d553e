//! Broadcast channel sink for live subscribers (WebSocket clients)

use crate::events::{EventSink, LedgerEvent};
use tokio::sync::broadcast;

/// Maximum number of events to buffer per subscriber
const BROADCAST_CAPACITY: usize = 100;

/// Broadcaster for ledger events
#[derive(Clone, Debug)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventBroadcaster {
    /// Create a new broadcaster
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Send an event to all current subscribers
    pub fn broadcast(&self, event: LedgerEvent) {
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBroadcaster {
    fn notify(&self, event: &LedgerEvent) {
        self.broadcast(event.clone());
    }
}
