//! Registry kept in process memory.

use super::Registry;
use crate::connection::{Connection, ConnectionId, RoutingEndpoint};
use crate::error::Error;
use async_trait::async_trait;
use dashmap::DashMap;
use log::*;

/// Registry backed by a concurrent map. Entries live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: DashMap<ConnectionId, RoutingEndpoint>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.entries.contains_key(connection_id)
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn put(&self, connection: Connection) -> Result<(), Error> {
        debug!("Registering connection {}", connection.connection_id);
        self.entries
            .insert(connection.connection_id, connection.endpoint);
        Ok(())
    }

    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), Error> {
        if self.entries.remove(connection_id).is_none() {
            trace!("Connection {connection_id} was not registered");
        }
        Ok(())
    }

    async fn snapshot_all(&self) -> Result<Vec<Connection>, Error> {
        // Collect before returning so no shard lock outlives this call.
        let snapshot: Vec<Connection> = self
            .entries
            .iter()
            .map(|entry| Connection::new(entry.key().clone(), entry.value().clone()))
            .collect();
        Ok(snapshot)
    }
}
