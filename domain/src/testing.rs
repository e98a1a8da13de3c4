//! Test doubles shared by the domain unit tests.

use crate::connection::{Connection, ConnectionId, RoutingEndpoint};
use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::gateway::Transport;
use crate::registry::{MemoryRegistry, Registry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn endpoint() -> RoutingEndpoint {
    RoutingEndpoint::new("example.com", "production")
}

pub(crate) fn connection(id: &str) -> Connection {
    Connection::new(ConnectionId::from(id), endpoint())
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Failure {
    Gone,
    Transient,
    /// Never answers within any reasonable delivery timeout.
    Hang,
}

/// Records every send and fails the ones configured to fail.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    failures: Mutex<HashMap<ConnectionId, Failure>>,
    attempts: AtomicUsize,
    delivered: Mutex<Vec<(ConnectionId, String)>>,
}

impl RecordingTransport {
    pub(crate) fn fail(self, id: &str, failure: Failure) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(ConnectionId::from(id), failure);
        self
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Payloads successfully delivered to `id`, in delivery order.
    pub(crate) fn received_by(&self, id: &str) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to.as_str() == id)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub(crate) fn delivered_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        connection_id: &ConnectionId,
        _endpoint: &RoutingEndpoint,
        payload: &[u8],
    ) -> Result<(), Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failure = self.failures.lock().unwrap().get(connection_id).copied();
        match failure {
            Some(Failure::Gone) => Err(Error::target_gone("gone")),
            Some(Failure::Transient) => Err(Error::transient("throttled")),
            Some(Failure::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::transient("hung"))
            }
            None => {
                self.delivered.lock().unwrap().push((
                    connection_id.clone(),
                    String::from_utf8_lossy(payload).into_owned(),
                ));
                Ok(())
            }
        }
    }
}

/// Registry whose every operation fails with a storage error.
#[derive(Default)]
pub(crate) struct FailingRegistry {
    deletes: AtomicUsize,
    snapshots: AtomicUsize,
}

impl FailingRegistry {
    pub(crate) fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub(crate) fn snapshot_calls(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }

    fn storage_error() -> Error {
        Error::with_source(
            DomainErrorKind::Internal(InternalErrorKind::Storage),
            "table unavailable",
        )
    }
}

#[async_trait]
impl Registry for FailingRegistry {
    async fn put(&self, _connection: Connection) -> Result<(), Error> {
        Err(Self::storage_error())
    }

    async fn delete(&self, _connection_id: &ConnectionId) -> Result<(), Error> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Err(Self::storage_error())
    }

    async fn snapshot_all(&self) -> Result<Vec<Connection>, Error> {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        Err(Self::storage_error())
    }
}

/// In-memory registry that counts snapshot reads.
#[derive(Default)]
pub(crate) struct CountingRegistry {
    inner: MemoryRegistry,
    snapshots: AtomicUsize,
}

impl CountingRegistry {
    pub(crate) fn snapshot_calls(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.inner.contains(&ConnectionId::from(id))
    }
}

#[async_trait]
impl Registry for CountingRegistry {
    async fn put(&self, connection: Connection) -> Result<(), Error> {
        self.inner.put(connection).await
    }

    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), Error> {
        self.inner.delete(connection_id).await
    }

    async fn snapshot_all(&self) -> Result<Vec<Connection>, Error> {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        self.inner.snapshot_all().await
    }
}
