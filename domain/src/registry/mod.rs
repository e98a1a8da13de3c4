//! The connection registry: a durable mapping from connection id to the
//! endpoint the transport uses to reach it.
//!
//! The registry holds at most one entry per id. Both writes are idempotent
//! and a snapshot is a full read that may be stale by the time it is used.

use crate::connection::{Connection, ConnectionId};
use crate::error::Error;
use async_trait::async_trait;

pub mod database;
pub mod memory;

pub use database::DatabaseRegistry;
pub use memory::MemoryRegistry;

#[async_trait]
pub trait Registry: Send + Sync {
    /// Inserts or overwrites the entry for `connection.connection_id`.
    async fn put(&self, connection: Connection) -> Result<(), Error>;

    /// Ensures no entry exists for `connection_id`.
    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), Error>;

    /// Reads every entry. An empty registry yields an empty vector.
    async fn snapshot_all(&self) -> Result<Vec<Connection>, Error>;
}
