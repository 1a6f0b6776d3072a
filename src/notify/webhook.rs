//! Webhook sinks

use crate::core::events::EventEnvelope;
use async_trait::async_trait;
use std::sync::Mutex;

/// Errors raised while delivering a webhook
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("webhook {url} rejected the delivery: {message}")]
    Rejected { url: String, message: String },

    #[error("webhook {url} unreachable: {message}")]
    Transport { url: String, message: String },
}

/// Destination for serialized event envelopes
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn deliver(&self, url: &str, envelope: &EventEnvelope) -> Result<(), DeliveryError>;
}

/// Sink posting envelopes as JSON over HTTP
#[cfg(feature = "push")]
#[derive(Debug, Clone, Default)]
pub struct HttpWebhookSink {
    client: reqwest::Client,
}

#[cfg(feature = "push")]
impl HttpWebhookSink {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "push")]
#[async_trait]
impl WebhookSink for HttpWebhookSink {
    async fn deliver(&self, url: &str, envelope: &EventEnvelope) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(url)
            .json(envelope)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                url: url.to_string(),
                message: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Sink keeping deliveries in memory
///
/// URLs listed in `failing` are rejected, which lets callers exercise the
/// failure path without a network.
#[derive(Debug, Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<(String, EventEnvelope)>>,
    failing: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            failing: urls.into_iter().map(Into::into).collect(),
        }
    }

    /// Successful deliveries in arrival order
    pub fn deliveries(&self) -> Vec<(String, EventEnvelope)> {
        self.deliveries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl WebhookSink for RecordingSink {
    async fn deliver(&self, url: &str, envelope: &EventEnvelope) -> Result<(), DeliveryError> {
        if self.failing.iter().any(|f| f == url) {
            return Err(DeliveryError::Rejected {
                url: url.to_string(),
                message: "503 Service Unavailable".to_string(),
            });
        }
        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.push((url.to_string(), envelope.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::MailAddressEvent;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_recording_sink_rejects_failing_urls() {
        let sink = RecordingSink::failing_on(["http://down.test"]);
        let envelope = EventEnvelope::new(MailAddressEvent::Deleted {
            address_id: Uuid::new_v4(),
            address: "x@example.com".to_string(),
        });

        let err = sink.deliver("http://down.test", &envelope).await.unwrap_err();
        assert!(err.to_string().contains("http://down.test"));
        assert!(sink.deliver("http://up.test", &envelope).await.is_ok());
        assert_eq!(sink.deliveries().len(), 1);
    }
}
