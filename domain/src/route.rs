//! Event categories and route selection for inbound frames.

use serde_json::Value;

pub const CONNECT_ROUTE_KEY: &str = "$connect";
pub const DISCONNECT_ROUTE_KEY: &str = "$disconnect";
pub const DEFAULT_ROUTE_KEY: &str = "$default";

/// What an inbound event asks the relay to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Connect,
    Disconnect,
    SendMessage,
    /// Any route key the relay has no handler for, `$default` included.
    Unrecognized(String),
}

impl Route {
    /// Maps a route key onto a route. `message_route` is the key that
    /// carries broadcast messages (`send_message` unless configured otherwise).
    pub fn from_route_key(route_key: &str, message_route: &str) -> Self {
        match route_key {
            CONNECT_ROUTE_KEY => Route::Connect,
            DISCONNECT_ROUTE_KEY => Route::Disconnect,
            key if key == message_route => Route::SendMessage,
            other => Route::Unrecognized(other.to_string()),
        }
    }
}

/// Picks the route for a frame received on an open socket by reading one
/// field of the JSON body.
#[derive(Clone, Debug)]
pub struct RouteSelector {
    field: String,
    message_route: String,
}

impl RouteSelector {
    pub fn new(field: impl Into<String>, message_route: impl Into<String>) -> Self {
        RouteSelector {
            field: field.into(),
            message_route: message_route.into(),
        }
    }

    pub fn message_route(&self) -> &str {
        &self.message_route
    }

    /// Non-JSON frames and frames without a string selection field go to the
    /// default route.
    pub fn select(&self, body: &str) -> Route {
        let key = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|document| {
                document
                    .get(&self.field)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_ROUTE_KEY.to_string());

        match key.as_str() {
            // Connect and disconnect are transport signals, never frame content.
            CONNECT_ROUTE_KEY | DISCONNECT_ROUTE_KEY => Route::Unrecognized(key),
            _ => Route::from_route_key(&key, &self.message_route),
        }
    }
}
