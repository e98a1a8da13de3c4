//! Registry persisted in the `ws_relay.connections` table.

use super::Registry;
use crate::connection::{Connection, ConnectionId};
use crate::error::Error;
use async_trait::async_trait;
use entity_api::connection as connection_api;
use log::*;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct DatabaseRegistry {
    db: Arc<DatabaseConnection>,
}

impl DatabaseRegistry {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        DatabaseRegistry { db }
    }
}

#[async_trait]
impl Registry for DatabaseRegistry {
    async fn put(&self, connection: Connection) -> Result<(), Error> {
        connection_api::upsert(
            self.db.as_ref(),
            connection.connection_id.as_str(),
            &connection.endpoint.domain_name,
            &connection.endpoint.stage,
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), Error> {
        let removed = connection_api::delete(self.db.as_ref(), connection_id.as_str()).await?;
        if removed == 0 {
            trace!("Connection {connection_id} had no registry row");
        }
        Ok(())
    }

    async fn snapshot_all(&self) -> Result<Vec<Connection>, Error> {
        let rows = connection_api::find_all(self.db.as_ref()).await?;
        Ok(rows.into_iter().map(Connection::from).collect())
    }
}
