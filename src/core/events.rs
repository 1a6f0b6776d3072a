//! Internal event system for mail-address lifecycle notifications
//!
//! Write paths publish onto the [`EventBus`]; notifiers subscribe and fan
//! events out to external webhooks without blocking the writer.
//!
//! ```text
//! create/update/delete ──▶ EventBus::publish() ──▶ broadcast channel ──▶ MailAddressNotifier ──▶ webhooks
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Lifecycle events of a mail address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MailAddressEvent {
    /// A mail address was created
    Created {
        address_id: Uuid,
        address: String,
        data: serde_json::Value,
    },
    /// A mail address was updated
    Updated {
        address_id: Uuid,
        address: String,
        data: serde_json::Value,
    },
    /// A mail address was deleted
    Deleted { address_id: Uuid, address: String },
}

impl MailAddressEvent {
    pub fn address_id(&self) -> Uuid {
        match self {
            MailAddressEvent::Created { address_id, .. }
            | MailAddressEvent::Updated { address_id, .. }
            | MailAddressEvent::Deleted { address_id, .. } => *address_id,
        }
    }

    /// Get the action name (created, updated, deleted)
    pub fn action(&self) -> &'static str {
        match self {
            MailAddressEvent::Created { .. } => "created",
            MailAddressEvent::Updated { .. } => "updated",
            MailAddressEvent::Deleted { .. } => "deleted",
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: MailAddressEvent,
}

impl EventEnvelope {
    pub fn new(event: MailAddressEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; every clone publishes to the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// Receivers that fall more than `capacity` events behind get a
    /// `Lagged` error on their next recv().
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers
    ///
    /// Returns the number of receivers that will see the event; zero when
    /// nobody is listening.
    pub fn publish(&self, event: MailAddressEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        self.sender.send(envelope).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn created(id: Uuid) -> MailAddressEvent {
        MailAddressEvent::Created {
            address_id: id,
            address: "ops@example.com".to_string(),
            data: json!({"display_name": "Ops"}),
        }
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let json = serde_json::to_value(created(Uuid::nil())).unwrap();
        assert_eq!(json["action"], "created");
        assert_eq!(json["address"], "ops@example.com");
    }

    #[test]
    fn test_event_accessors() {
        let id = Uuid::new_v4();
        let event = MailAddressEvent::Deleted {
            address_id: id,
            address: "old@example.com".to_string(),
        };
        assert_eq!(event.address_id(), id);
        assert_eq!(event.action(), "deleted");
    }

    #[test]
    fn test_event_envelope_has_metadata() {
        let envelope = EventEnvelope::new(created(Uuid::new_v4()));
        assert!(!envelope.id.is_nil());
        assert!(envelope.timestamp <= Utc::now());
    }

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let id = Uuid::new_v4();
        assert_eq!(bus.publish(created(id)), 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event.address_id(), id);
        assert_eq!(received.event.action(), "created");
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.clone().subscribe();
        assert_eq!(bus.receiver_count(), 2);

        bus.publish(created(Uuid::new_v4()));

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.id, e2.id);
    }

    #[test]
    fn test_event_bus_publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(created(Uuid::new_v4())), 0);
    }
}
