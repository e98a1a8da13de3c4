//! Session registration and local delivery.
//!
//! Every session opened here is recorded under this instance's endpoint. When
//! several relay instances share one registry, a row whose endpoint names a
//! different instance belongs to a socket this process cannot see, so a
//! missing session is only proof of a stale row when the row is ours.

use crate::connection::{EnqueueError, SessionInfo, SessionRegistry};
use async_trait::async_trait;
use domain::connection::{ConnectionId, RoutingEndpoint};
use domain::error::{DomainErrorKind, Error, InternalErrorKind, MessageErrorKind};
use domain::gateway::Transport;
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver};

pub struct Manager {
    sessions: Arc<SessionRegistry>,
    endpoint: RoutingEndpoint,
    send_queue: usize,
}

impl Manager {
    /// `endpoint` identifies this instance in registry rows; `send_queue` is
    /// the per-session outbound buffer, in frames.
    pub fn new(endpoint: RoutingEndpoint, send_queue: usize) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new()),
            endpoint,
            send_queue: send_queue.max(1),
        }
    }

    /// Routing endpoint recorded for every session opened here.
    pub fn endpoint(&self) -> &RoutingEndpoint {
        &self.endpoint
    }

    /// Open a session for a freshly accepted socket. The caller drains the
    /// returned receiver into the socket.
    pub fn register_session(&self) -> (ConnectionId, Receiver<String>) {
        let connection_id = ConnectionId::generate();
        let (sender, receiver) = mpsc::channel(self.send_queue);

        self.sessions
            .insert(connection_id.clone(), SessionInfo { sender });
        info!("Registered WebSocket session {connection_id}");

        (connection_id, receiver)
    }

    pub fn unregister_session(&self, connection_id: &ConnectionId) {
        if self.sessions.remove(connection_id).is_some() {
            info!("Unregistered WebSocket session {connection_id}");
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn owns(&self, endpoint: &RoutingEndpoint) -> bool {
        endpoint.domain_name == self.endpoint.domain_name
    }
}

#[async_trait]
impl Transport for Manager {
    async fn send(
        &self,
        connection_id: &ConnectionId,
        endpoint: &RoutingEndpoint,
        payload: &[u8],
    ) -> Result<(), Error> {
        let frame = String::from_utf8(payload.to_vec()).map_err(|e| {
            Error::with_source(
                DomainErrorKind::Internal(InternalErrorKind::Message(MessageErrorKind::Encode)),
                e,
            )
        })?;

        self.sessions
            .try_enqueue(connection_id, frame)
            .map_err(|e| match e {
                EnqueueError::Gone if self.owns(endpoint) => {
                    Error::target_gone(format!("no open session for {connection_id}"))
                }
                EnqueueError::Gone => Error::transient(format!(
                    "connection {connection_id} is held by {}, not this instance",
                    endpoint.domain_name
                )),
                EnqueueError::Full => {
                    Error::transient(format!("send queue full for {connection_id}"))
                }
            })
    }
}
