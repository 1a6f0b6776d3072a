//! Webhook fan-out for mail-address lifecycle events
//!
//! A [`MailAddressNotifier`] subscribes to the [`EventBus`] and forwards every
//! envelope to the configured webhook URLs through a [`WebhookSink`].

pub mod webhook;

#[cfg(feature = "push")]
pub use webhook::HttpWebhookSink;
pub use webhook::{DeliveryError, RecordingSink, WebhookSink};

use crate::config::WebhookConfig;
use crate::core::events::{EventBus, EventEnvelope};
use std::sync::Arc;
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tokio::task::JoinHandle;

/// Background task forwarding bus events to webhooks
#[derive(Clone)]
pub struct MailAddressNotifier {
    urls: Vec<String>,
    sink: Arc<dyn WebhookSink>,
}

impl MailAddressNotifier {
    pub fn new(urls: Vec<String>, sink: Arc<dyn WebhookSink>) -> Self {
        Self { urls, sink }
    }

    /// Notifier for the configured mail-address webhooks
    pub fn from_config(config: &WebhookConfig, sink: Arc<dyn WebhookSink>) -> Self {
        Self::new(config.mail_address.clone(), sink)
    }

    /// Subscribe to `bus` and run until the bus is dropped
    ///
    /// The subscription is taken before the task starts, so events
    /// published right after this call are not missed.
    pub fn spawn(self, bus: &EventBus) -> JoinHandle<()> {
        let receiver = bus.subscribe();
        tokio::spawn(self.run(receiver))
    }

    async fn run(self, mut receiver: Receiver<EventEnvelope>) {
        loop {
            match receiver.recv().await {
                Ok(envelope) => self.dispatch(&envelope).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "mail address notifier lagged behind the event bus");
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("event bus closed, stopping mail address notifier");
                    break;
                }
            }
        }
    }

    /// Deliver one envelope to every URL; failures are logged and skipped
    pub async fn dispatch(&self, envelope: &EventEnvelope) {
        for url in &self.urls {
            match self.sink.deliver(url, envelope).await {
                Ok(()) => tracing::debug!(
                    url = %url,
                    event_id = %envelope.id,
                    action = envelope.event.action(),
                    "webhook delivered"
                ),
                Err(e) => tracing::warn!(
                    url = %url,
                    event_id = %envelope.id,
                    error = %e,
                    "webhook delivery failed"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::MailAddressEvent;
    use uuid::Uuid;

    fn deleted() -> MailAddressEvent {
        MailAddressEvent::Deleted {
            address_id: Uuid::new_v4(),
            address: "gone@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_reaches_every_url() {
        let sink = Arc::new(RecordingSink::new());
        let notifier = MailAddressNotifier::new(
            vec!["http://a.test/hook".into(), "http://b.test/hook".into()],
            sink.clone(),
        );

        notifier.dispatch(&EventEnvelope::new(deleted())).await;

        let urls: Vec<String> = sink.deliveries().into_iter().map(|(u, _)| u).collect();
        assert_eq!(urls, vec!["http://a.test/hook", "http://b.test/hook"]);
    }

    #[tokio::test]
    async fn test_notifier_stops_when_bus_dropped() {
        let sink = Arc::new(RecordingSink::new());
        let bus = EventBus::new(8);
        let config = WebhookConfig {
            mail_address: vec!["http://a.test".to_string()],
        };
        let handle = MailAddressNotifier::from_config(&config, sink.clone()).spawn(&bus);

        bus.publish(deleted());
        drop(bus);

        handle.await.unwrap();
        assert_eq!(sink.deliveries().len(), 1);
    }
}
