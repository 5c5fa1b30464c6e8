//! Publishes domain events to NATS when a server is configured.

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    /// No-op publisher.
    pub fn disabled() -> Self { Self::default() }

    /// Connects when `url` is given. A failed connection logs and falls back
    /// to a disabled publisher.
    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::disabled() };
        match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!(url, "connected to NATS");
                Self { nats: Some(client) }
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "NATS unavailable; domain events will not be published");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    pub async fn publish(&self, events: Vec<DomainEvent>) {
        let Some(nats) = &self.nats else { return };
        for event in events {
            let subject = event.subject();
            let payload = match serde_json::to_vec(&event) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(subject = %subject, error = %e, "event not serializable");
                    continue;
                }
            };
            if let Err(e) = nats.publish(subject.clone(), payload.into()).await {
                tracing::warn!(subject = %subject, error = %e, "failed to publish event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::CustomerEvent;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_disabled_publisher_drops_events() {
        let p = EventPublisher::connect(None).await;
        assert!(!p.is_enabled());
        p.publish(vec![DomainEvent::Customer(CustomerEvent::Registered { customer_id: Uuid::nil(), phone: "+15550001111".into() })]).await;
    }
}
