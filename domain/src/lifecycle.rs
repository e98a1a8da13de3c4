//! Registers and deregisters connections as their transport sessions open
//! and close.

use crate::connection::{Connection, ConnectionId, RoutingEndpoint};
use crate::error::Error;
use crate::registry::Registry;
use log::*;
use std::sync::Arc;

#[derive(Clone)]
pub struct LifecycleController {
    registry: Arc<dyn Registry>,
}

impl LifecycleController {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        LifecycleController { registry }
    }

    /// Records the connection as deliverable. Storage failures are returned
    /// to the caller without retry.
    pub async fn on_connect(
        &self,
        connection_id: &ConnectionId,
        endpoint: &RoutingEndpoint,
    ) -> Result<(), Error> {
        info!("Connect: {connection_id} ({}/{})", endpoint.domain_name, endpoint.stage);

        self.registry
            .put(Connection::new(connection_id.clone(), endpoint.clone()))
            .await
            .map_err(|e| {
                warn!("Failed to register connection {connection_id}: {e}");
                e
            })
    }

    pub async fn on_disconnect(&self, connection_id: &ConnectionId) -> Result<(), Error> {
        info!("Disconnect: {connection_id}");

        self.registry.delete(connection_id).await.map_err(|e| {
            warn!("Failed to deregister connection {connection_id}: {e}");
            e
        })
    }

    /// Logs an event whose route has no handler. The registry is untouched.
    pub fn on_unroutable_route(
        &self,
        connection_id: &ConnectionId,
        route_key: &str,
        raw_body: Option<&str>,
    ) {
        info!("Route key: {route_key}");
        info!("Connection ID: {connection_id}");
        info!("Raw body: {}", raw_body.unwrap_or(""));
    }
}
