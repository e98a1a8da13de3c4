//! Internal relay events.
//!
//! Components that discover something about a connection publish a
//! [`RelayEvent`] instead of acting on it themselves. The fanout path, for
//! example, learns at delivery time that a session is gone, but the row removal
//! belongs to whoever owns the registry. Handlers registered on the
//! [`EventPublisher`] carry out those side effects.
//!
//! This crate depends on no other workspace crate. Connection ids travel as
//! plain strings.

use async_trait::async_trait;
use std::sync::Arc;

/// Events raised while relaying traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// A delivery attempt reported that the target's transport session no
    /// longer exists. Its registry row is stale and should be evicted.
    ConnectionGone { connection_id: String },
}

/// Reacts to relay events. Handlers own their failures: `handle` has no
/// error channel back to the publisher.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &RelayEvent);
}

/// Publishes relay events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Returns a publisher that also notifies `handler`.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers.
    pub async fn publish(&self, event: RelayEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<RelayEvent>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &RelayEvent) {
            self.seen.lock().await.push(event.clone());
        }
    }

    #[tokio::test]
    async fn publish_reaches_every_registered_handler() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let publisher = EventPublisher::new()
            .with_handler(first.clone())
            .with_handler(second.clone());

        let event = RelayEvent::ConnectionGone {
            connection_id: "B".to_string(),
        };
        publisher.publish(event.clone()).await;

        assert_eq!(publisher.handler_count(), 2);
        assert_eq!(*first.seen.lock().await, vec![event.clone()]);
        assert_eq!(*second.seen.lock().await, vec![event]);
    }

    #[tokio::test]
    async fn publish_without_handlers_is_a_no_op() {
        let publisher = EventPublisher::default();
        publisher
            .publish(RelayEvent::ConnectionGone {
                connection_id: "A".to_string(),
            })
            .await;
        assert_eq!(publisher.handler_count(), 0);
    }

    #[tokio::test]
    async fn with_handler_leaves_earlier_clones_untouched() {
        let base = EventPublisher::new();
        let extended = base.clone().with_handler(Arc::new(Recorder::default()));

        assert_eq!(base.handler_count(), 0);
        assert_eq!(extended.handler_count(), 1);
    }
}
