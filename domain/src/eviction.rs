//! Lazy eviction of connections that fanout found to be gone.

use crate::connection::ConnectionId;
use crate::registry::Registry;
use async_trait::async_trait;
use events::{EventHandler, RelayEvent};
use log::*;
use std::sync::Arc;

/// Removes registry entries whose transport session was reported gone.
pub struct EvictionHandler {
    registry: Arc<dyn Registry>,
}

impl EvictionHandler {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        EvictionHandler { registry }
    }
}

#[async_trait]
impl EventHandler for EvictionHandler {
    async fn handle(&self, event: &RelayEvent) {
        match event {
            RelayEvent::ConnectionGone { connection_id } => {
                let connection_id = ConnectionId::from(connection_id.as_str());
                match self.registry.delete(&connection_id).await {
                    Ok(()) => info!("Evicted stale connection {connection_id}"),
                    // The row stays until a later broadcast or disconnect removes it.
                    Err(e) => warn!("Failed to evict stale connection {connection_id}: {e}"),
                }
            }
        }
    }
}
