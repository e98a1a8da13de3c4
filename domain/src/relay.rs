//! Entry point for inbound relay events.
//!
//! [`Relay::dispatch`] routes one event to the lifecycle controller or the
//! fanout engine and always answers with a definite [`EventResponse`].

use crate::connection::{ConnectionId, RoutingEndpoint};
use crate::error::Error;
use crate::eviction::EvictionHandler;
use crate::fanout::{BroadcastOutcome, FanoutEngine, FanoutOptions};
use crate::gateway::Transport;
use crate::lifecycle::LifecycleController;
use crate::registry::Registry;
use crate::route::{Route, RouteSelector};
use events::EventPublisher;
use log::*;
use service::config::Config;
use std::sync::Arc;

pub const CONNECTED: &str = "Connected";
pub const CONNECT_FAILED: &str = "Failed to connect";
pub const DISCONNECTED: &str = "Disconnected";
pub const DISCONNECT_FAILED: &str = "Failed to disconnect";
pub const MESSAGE_SENT: &str = "Message sent to all connections";
pub const INVALID_MESSAGE: &str = "Invalid message";
pub const REGISTRY_UNAVAILABLE: &str = "Error reading connections";
pub const DEFAULT_ROUTE: &str = "Default route triggered. No matching action found.";

#[derive(Clone, Debug)]
pub struct RelayOptions {
    pub fanout: FanoutOptions,
    pub route_selection_field: String,
    pub message_route: String,
}

impl RelayOptions {
    pub fn from_config(config: &Config) -> Self {
        RelayOptions {
            fanout: FanoutOptions::from_config(config),
            route_selection_field: config.route_selection_field().to_string(),
            message_route: config.message_route().to_string(),
        }
    }
}

impl Default for RelayOptions {
    fn default() -> Self {
        RelayOptions {
            fanout: FanoutOptions::default(),
            route_selection_field: "action".to_string(),
            message_route: "send_message".to_string(),
        }
    }
}

/// One event as delivered by the transport layer.
#[derive(Clone, Debug)]
pub struct InboundEvent {
    pub connection_id: ConnectionId,
    pub endpoint: RoutingEndpoint,
    pub route: Route,
    pub body: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseOutcome {
    Success,
    ClientError,
    ServerError,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventResponse {
    pub outcome: ResponseOutcome,
    pub message: String,
    /// Present for message events that reached delivery.
    pub broadcast: Option<BroadcastOutcome>,
}

impl EventResponse {
    fn new(outcome: ResponseOutcome, message: &str) -> Self {
        EventResponse {
            outcome,
            message: message.to_string(),
            broadcast: None,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self.outcome {
            ResponseOutcome::Success => 200,
            ResponseOutcome::ClientError => 400,
            ResponseOutcome::ServerError => 500,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ResponseOutcome::Success
    }
}

pub struct Relay {
    lifecycle: LifecycleController,
    fanout: FanoutEngine,
    selector: RouteSelector,
}

impl Relay {
    /// Wires the lifecycle controller and the fanout engine to the same
    /// registry, with stale-connection eviction subscribed to fanout events.
    pub fn new(
        registry: Arc<dyn Registry>,
        transport: Arc<dyn Transport>,
        options: RelayOptions,
    ) -> Self {
        let events =
            EventPublisher::new().with_handler(Arc::new(EvictionHandler::new(registry.clone())));

        Relay {
            lifecycle: LifecycleController::new(registry.clone()),
            fanout: FanoutEngine::new(registry, transport, events, options.fanout),
            selector: RouteSelector::new(options.route_selection_field, options.message_route),
        }
    }

    pub fn selector(&self) -> &RouteSelector {
        &self.selector
    }

    /// Maps a route key received from the gateway onto a route.
    pub fn route_for_key(&self, route_key: &str) -> Route {
        Route::from_route_key(route_key, self.selector.message_route())
    }

    pub async fn dispatch(&self, event: InboundEvent) -> EventResponse {
        let InboundEvent {
            connection_id,
            endpoint,
            route,
            body,
        } = event;

        match route {
            Route::Connect => match self.lifecycle.on_connect(&connection_id, &endpoint).await {
                Ok(()) => EventResponse::new(ResponseOutcome::Success, CONNECTED),
                Err(_) => EventResponse::new(ResponseOutcome::ServerError, CONNECT_FAILED),
            },
            Route::Disconnect => match self.lifecycle.on_disconnect(&connection_id).await {
                Ok(()) => EventResponse::new(ResponseOutcome::Success, DISCONNECTED),
                Err(_) => EventResponse::new(ResponseOutcome::ServerError, DISCONNECT_FAILED),
            },
            Route::SendMessage => {
                let result = self
                    .fanout
                    .broadcast(&connection_id, &endpoint, body.as_deref())
                    .await;
                broadcast_response(result)
            }
            Route::Unrecognized(route_key) => {
                self.lifecycle
                    .on_unroutable_route(&connection_id, &route_key, body.as_deref());
                EventResponse::new(ResponseOutcome::Success, DEFAULT_ROUTE)
            }
        }
    }
}

fn broadcast_response(result: Result<BroadcastOutcome, Error>) -> EventResponse {
    match result {
        Ok(outcome) => EventResponse {
            outcome: ResponseOutcome::Success,
            message: MESSAGE_SENT.to_string(),
            broadcast: Some(outcome),
        },
        Err(e) if e.is_invalid_message() => {
            EventResponse::new(ResponseOutcome::ClientError, INVALID_MESSAGE)
        }
        Err(e) if e.is_registry_unavailable() => {
            EventResponse::new(ResponseOutcome::ServerError, REGISTRY_UNAVAILABLE)
        }
        Err(e) => {
            error!("Broadcast failed: {e}");
            EventResponse::new(ResponseOutcome::ServerError, REGISTRY_UNAVAILABLE)
        }
    }
}
