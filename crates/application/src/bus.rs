//! In-process domain event bus.
//!
//! Subscribers register for an event type by name; `publish` delivers the
//! event to subscribers in registration order and awaits each one before
//! moving on. Delivery happens after the order is saved, so a subscriber
//! failure surfaces to the caller but the state change is already durable.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::OrderEvent;
use tokio::sync::RwLock;

use crate::{AppError, Result};

/// Handles domain events published on the bus.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Name used in logs and subscriber failure errors.
    fn name(&self) -> &'static str;

    /// Handles a single event.
    async fn on_event(&self, event: &OrderEvent) -> Result<()>;
}

/// Dispatches domain events to registered subscribers.
///
/// An instance is injected into the services that publish; there is no
/// global bus.
#[derive(Default)]
pub struct DomainEventBus {
    subscribers: RwLock<HashMap<String, Vec<Arc<dyn EventSubscriber>>>>,
}

impl DomainEventBus {
    /// Creates a new bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for the given event type.
    pub async fn subscribe(&self, event_type: &str, subscriber: Arc<dyn EventSubscriber>) {
        let mut subscribers = self.subscribers.write().await;
        subscribers
            .entry(event_type.to_string())
            .or_default()
            .push(subscriber);
    }

    /// Returns the number of subscribers registered for an event type.
    pub async fn subscriber_count(&self, event_type: &str) -> usize {
        let subscribers = self.subscribers.read().await;
        subscribers.get(event_type).map_or(0, Vec::len)
    }

    /// Delivers an event to its subscribers in registration order.
    ///
    /// The first subscriber failure stops delivery and is returned to the
    /// caller.
    pub async fn publish(&self, event: &OrderEvent) -> Result<()> {
        let matching = {
            let subscribers = self.subscribers.read().await;
            subscribers.get(event.event_type()).cloned()
        };

        let Some(matching) = matching else {
            tracing::trace!(event_type = event.event_type(), "no subscribers for event");
            return Ok(());
        };

        for subscriber in &matching {
            subscriber
                .on_event(event)
                .await
                .map_err(|e| AppError::Subscriber {
                    subscriber: subscriber.name(),
                    message: e.to_string(),
                })?;
            tracing::debug!(
                event_type = event.event_type(),
                subscriber = subscriber.name(),
                "event delivered"
            );
        }

        metrics::counter!("events_published_total", "event_type" => event.event_type())
            .increment(1);
        Ok(())
    }
}
