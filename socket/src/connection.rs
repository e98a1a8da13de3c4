//! Session table for sockets accepted by this process.

use dashmap::DashMap;
use domain::connection::ConnectionId;
use log::*;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

/// Session information for one open socket.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub sender: Sender<String>,
}

/// Why a frame could not be queued for a session.
#[derive(Debug, PartialEq, Eq)]
pub enum EnqueueError {
    /// No session with that id, or its receiver was dropped.
    Gone,
    /// The session's outbound queue is at capacity.
    Full,
}

/// Open sessions keyed by connection id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<ConnectionId, SessionInfo>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, connection_id: ConnectionId, info: SessionInfo) {
        self.sessions.insert(connection_id, info);
    }

    pub fn remove(&self, connection_id: &ConnectionId) -> Option<SessionInfo> {
        self.sessions.remove(connection_id).map(|(_, info)| info)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Queue a text frame without waiting for room.
    pub fn try_enqueue(&self, connection_id: &ConnectionId, frame: String) -> Result<(), EnqueueError> {
        // Clone the sender so the shard lock is released before sending.
        let sender = match self.sessions.get(connection_id) {
            Some(info) => info.sender.clone(),
            None => return Err(EnqueueError::Gone),
        };

        sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => {
                debug!("Send queue full for session {connection_id}");
                EnqueueError::Full
            }
            TrySendError::Closed(_) => {
                debug!("Session {connection_id} writer has stopped");
                EnqueueError::Gone
            }
        })
    }
}
