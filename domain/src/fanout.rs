//! Broadcast fanout.
//!
//! A broadcast reads the whole registry once and pushes the message to every
//! entry, the sender included, after acknowledging the sender separately.
//! Only a malformed message or an unreadable registry abort a broadcast. A
//! failed delivery to one peer never stops delivery to the others; a peer
//! reported gone is handed to the event publisher for eviction.

use crate::connection::{Connection, ConnectionId, RoutingEndpoint};
use crate::envelope::{encode_broadcast, encode_self_ack, parse_inbound};
use crate::error::Error;
use crate::gateway::Transport;
use crate::registry::Registry;
use events::{EventPublisher, RelayEvent};
use futures::{stream, StreamExt};
use log::*;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct FanoutOptions {
    /// Upper bound on a single delivery attempt; expiry counts as transient.
    pub delivery_timeout: Duration,
    /// Deliveries in flight at once for one broadcast.
    pub max_concurrent_deliveries: usize,
}

impl FanoutOptions {
    pub fn from_config(config: &Config) -> Self {
        FanoutOptions {
            delivery_timeout: config.delivery_timeout(),
            max_concurrent_deliveries: config.max_concurrent_deliveries,
        }
    }
}

impl Default for FanoutOptions {
    fn default() -> Self {
        FanoutOptions {
            delivery_timeout: Duration::from_millis(3000),
            max_concurrent_deliveries: 64,
        }
    }
}

/// Per-broadcast tally. `recipients` is the snapshot size; the self-ack is
/// counted separately in `acknowledged`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub recipients: usize,
    pub delivered: usize,
    pub stale: usize,
    pub failed: usize,
    pub acknowledged: bool,
}

impl BroadcastOutcome {
    /// Delivery attempts made: one per recipient plus the self-ack.
    pub fn attempts(&self) -> usize {
        self.recipients + 1
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Delivery {
    Delivered,
    Stale,
    Failed,
}

pub struct FanoutEngine {
    registry: Arc<dyn Registry>,
    transport: Arc<dyn Transport>,
    events: EventPublisher,
    options: FanoutOptions,
}

impl FanoutEngine {
    pub fn new(
        registry: Arc<dyn Registry>,
        transport: Arc<dyn Transport>,
        events: EventPublisher,
        options: FanoutOptions,
    ) -> Self {
        FanoutEngine {
            registry,
            transport,
            events,
            options,
        }
    }

    pub async fn broadcast(
        &self,
        sender_id: &ConnectionId,
        sender_endpoint: &RoutingEndpoint,
        raw_payload: Option<&str>,
    ) -> Result<BroadcastOutcome, Error> {
        let message = parse_inbound(raw_payload).map_err(|e| {
            warn!("Rejected message from {sender_id}: {e}");
            e
        })?;
        let ack = encode_self_ack(sender_id)?;
        let envelope = encode_broadcast(sender_id, &message)?;

        let snapshot = self.registry.snapshot_all().await.map_err(|e| {
            error!("Error reading connections for broadcast from {sender_id}: {e}");
            e.into_registry_unavailable()
        })?;

        let acknowledged = match self.deliver(sender_id, sender_endpoint, &ack).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Error sending connection id back to {sender_id}: {e}");
                false
            }
        };

        let recipients = snapshot.len();
        let deliveries: Vec<Delivery> = stream::iter(snapshot)
            .map(|connection| self.deliver_to_peer(connection, &envelope))
            .buffer_unordered(self.options.max_concurrent_deliveries.max(1))
            .collect()
            .await;

        let mut outcome = BroadcastOutcome {
            recipients,
            acknowledged,
            ..Default::default()
        };
        for delivery in deliveries {
            match delivery {
                Delivery::Delivered => outcome.delivered += 1,
                Delivery::Stale => outcome.stale += 1,
                Delivery::Failed => outcome.failed += 1,
            }
        }

        debug!("Broadcast from {sender_id}: {outcome:?}");

        Ok(outcome)
    }

    async fn deliver_to_peer(&self, connection: Connection, payload: &[u8]) -> Delivery {
        let connection_id = &connection.connection_id;

        match self.deliver(connection_id, &connection.endpoint, payload).await {
            Ok(()) => Delivery::Delivered,
            Err(e) if e.is_target_gone() => {
                info!("Connection {connection_id} is gone, requesting eviction");
                self.events
                    .publish(RelayEvent::ConnectionGone {
                        connection_id: connection_id.to_string(),
                    })
                    .await;
                Delivery::Stale
            }
            Err(e) => {
                warn!("Error sending to {connection_id}: {e}");
                Delivery::Failed
            }
        }
    }

    async fn deliver(
        &self,
        connection_id: &ConnectionId,
        endpoint: &RoutingEndpoint,
        payload: &[u8],
    ) -> Result<(), Error> {
        let timeout = self.options.delivery_timeout;
        match tokio::time::timeout(timeout, self.transport.send(connection_id, endpoint, payload))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::transient(format!(
                "delivery to {connection_id} timed out after {timeout:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::EvictionHandler;
    use crate::testing::{
        connection, endpoint, CountingRegistry, FailingRegistry, Failure, RecordingTransport,
    };

    fn engine(registry: Arc<dyn Registry>, transport: Arc<RecordingTransport>) -> FanoutEngine {
        let events =
            EventPublisher::new().with_handler(Arc::new(EvictionHandler::new(registry.clone())));
        FanoutEngine::new(
            registry,
            transport,
            events,
            FanoutOptions {
                delivery_timeout: Duration::from_millis(50),
                max_concurrent_deliveries: 4,
            },
        )
    }

    async fn registry_with(ids: &[&str]) -> Arc<CountingRegistry> {
        let registry = Arc::new(CountingRegistry::default());
        for id in ids {
            registry.put(connection(id)).await.unwrap();
        }
        registry
    }

    #[tokio::test]
    async fn every_peer_receives_the_broadcast_and_the_sender_its_ack() -> Result<(), Error> {
        let registry = registry_with(&["A", "B", "C"]).await;
        let transport = Arc::new(RecordingTransport::default());

        let outcome = engine(registry, transport.clone())
            .broadcast(&ConnectionId::from("A"), &endpoint(), Some(r#"{"data":"hi"}"#))
            .await?;

        assert_eq!(
            transport.received_by("A"),
            vec![
                r#"{"connectionId":"A"}"#.to_string(),
                r#"{"from":"A","message":"hi"}"#.to_string()
            ]
        );
        assert_eq!(transport.received_by("B"), vec![r#"{"from":"A","message":"hi"}"#]);
        assert_eq!(transport.received_by("C"), vec![r#"{"from":"A","message":"hi"}"#]);
        assert_eq!(
            outcome,
            BroadcastOutcome {
                recipients: 3,
                delivered: 3,
                stale: 0,
                failed: 0,
                acknowledged: true,
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn makes_one_attempt_per_entry_plus_the_ack() -> Result<(), Error> {
        let ids = ["A", "B", "C", "D", "E", "F", "G"];
        let registry = registry_with(&ids).await;
        let transport = Arc::new(RecordingTransport::default());

        let outcome = engine(registry, transport.clone())
            .broadcast(&ConnectionId::from("A"), &endpoint(), Some(r#"{"data":1}"#))
            .await?;

        assert_eq!(transport.attempts(), ids.len() + 1);
        assert_eq!(outcome.attempts(), ids.len() + 1);
        Ok(())
    }

    #[tokio::test]
    async fn gone_peer_is_evicted_without_failing_the_broadcast() -> Result<(), Error> {
        let registry = registry_with(&["A", "B"]).await;
        let transport = Arc::new(RecordingTransport::default().fail("B", Failure::Gone));

        let outcome = engine(registry.clone(), transport.clone())
            .broadcast(&ConnectionId::from("A"), &endpoint(), Some(r#"{"data":"hi"}"#))
            .await?;

        assert_eq!(transport.received_by("A").len(), 2);
        assert!(transport.received_by("B").is_empty());
        assert!(registry.contains("A"));
        assert!(!registry.contains("B"));
        assert_eq!(outcome.stale, 1);
        assert_eq!(outcome.delivered, 1);
        Ok(())
    }

    #[tokio::test]
    async fn transient_failures_are_not_evicted() -> Result<(), Error> {
        let registry = registry_with(&["A", "B", "C"]).await;
        let transport = Arc::new(RecordingTransport::default().fail("B", Failure::Transient));

        let outcome = engine(registry.clone(), transport.clone())
            .broadcast(&ConnectionId::from("A"), &endpoint(), Some(r#"{"data":"hi"}"#))
            .await?;

        assert!(registry.contains("B"));
        assert_eq!(transport.received_by("C").len(), 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.stale, 0);
        Ok(())
    }

    #[tokio::test]
    async fn timed_out_delivery_counts_as_transient() -> Result<(), Error> {
        let registry = registry_with(&["A", "B", "C"]).await;
        let transport = Arc::new(RecordingTransport::default().fail("B", Failure::Hang));

        let outcome = engine(registry.clone(), transport.clone())
            .broadcast(&ConnectionId::from("A"), &endpoint(), Some(r#"{"data":"hi"}"#))
            .await?;

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.delivered, 2);
        assert!(registry.contains("B"));
        Ok(())
    }

    #[tokio::test]
    async fn failed_ack_does_not_abort_the_broadcast() -> Result<(), Error> {
        let registry = registry_with(&["B"]).await;
        // The sender is not registered and its own session is gone.
        let transport = Arc::new(RecordingTransport::default().fail("A", Failure::Gone));

        let outcome = engine(registry, transport.clone())
            .broadcast(&ConnectionId::from("A"), &endpoint(), Some(r#"{"data":"hi"}"#))
            .await?;

        assert!(!outcome.acknowledged);
        assert_eq!(transport.received_by("B").len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_touches_neither_registry_nor_transport() {
        let registry = registry_with(&["A", "B"]).await;
        let transport = Arc::new(RecordingTransport::default());
        let engine = engine(registry.clone(), transport.clone());

        for raw in [None, Some("not json"), Some("[1,2]"), Some(r#"{"other":1}"#)] {
            let err = engine
                .broadcast(&ConnectionId::from("A"), &endpoint(), raw)
                .await
                .unwrap_err();
            assert!(err.is_invalid_message());
        }

        assert_eq!(registry.snapshot_calls(), 0);
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn registry_failure_aborts_before_any_delivery() {
        let registry = Arc::new(FailingRegistry::default());
        let transport = Arc::new(RecordingTransport::default());

        let err = engine(registry.clone(), transport.clone())
            .broadcast(&ConnectionId::from("A"), &endpoint(), Some(r#"{"data":"hi"}"#))
            .await
            .unwrap_err();

        assert!(err.is_registry_unavailable());
        assert_eq!(registry.snapshot_calls(), 1);
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn empty_registry_only_acknowledges_the_sender() -> Result<(), Error> {
        let registry = registry_with(&[]).await;
        let transport = Arc::new(RecordingTransport::default());

        let outcome = engine(registry, transport.clone())
            .broadcast(&ConnectionId::from("A"), &endpoint(), Some(r#"{"data":"hi"}"#))
            .await?;

        assert_eq!(outcome.recipients, 0);
        assert!(outcome.acknowledged);
        assert_eq!(transport.delivered_count(), 1);
        Ok(())
    }
}
