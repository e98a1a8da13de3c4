//! Shared fixtures for router and socket tests.

use crate::AppState;
use async_trait::async_trait;
use clap::Parser;
use domain::connection::{Connection, ConnectionId, RoutingEndpoint};
use domain::error::{DomainErrorKind, Error, InternalErrorKind};
use domain::registry::{MemoryRegistry, Registry};
use domain::relay::{Relay, RelayOptions};
use service::config::Config;
use std::sync::Arc;

/// App state backed by an in-memory registry and local socket delivery.
/// Returns the registry so tests can inspect it.
pub(crate) fn app_state() -> (AppState, Arc<MemoryRegistry>) {
    let registry = Arc::new(MemoryRegistry::new());
    (app_state_with(registry.clone()), registry)
}

pub(crate) fn app_state_with(registry: Arc<dyn Registry>) -> AppState {
    let config = Config::try_parse_from(["ws_relay"]).unwrap();
    let sockets = Arc::new(socket::Manager::new(
        RoutingEndpoint::new(config.instance_address(), config.stage()),
        config.session_send_queue,
    ));
    let relay = Relay::new(registry, sockets.clone(), RelayOptions::from_config(&config));

    AppState::new(config, Arc::new(relay), sockets)
}

/// Registry whose every operation fails with a storage error.
pub(crate) struct FailingRegistry;

fn storage_error() -> Error {
    Error::with_source(
        DomainErrorKind::Internal(InternalErrorKind::Storage),
        "table unavailable",
    )
}

#[async_trait]
impl Registry for FailingRegistry {
    async fn put(&self, _connection: Connection) -> Result<(), Error> {
        Err(storage_error())
    }

    async fn delete(&self, _connection_id: &ConnectionId) -> Result<(), Error> {
        Err(storage_error())
    }

    async fn snapshot_all(&self) -> Result<Vec<Connection>, Error> {
        Err(storage_error())
    }
}
