//! Connection identity and routing metadata.

use crate::connections;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of one transport session. Assigned once at connect time
/// and used as the registry's primary key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        ConnectionId(id.into())
    }

    /// Mints a fresh id for a session accepted by this process.
    pub fn generate() -> Self {
        ConnectionId(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        ConnectionId::new(id)
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        ConnectionId(id)
    }
}

/// Where the transport can reach a connection. Captured at connect and never
/// changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingEndpoint {
    pub domain_name: String,
    pub stage: String,
}

impl RoutingEndpoint {
    pub fn new(domain_name: impl Into<String>, stage: impl Into<String>) -> Self {
        RoutingEndpoint {
            domain_name: domain_name.into(),
            stage: stage.into(),
        }
    }

    /// Base URL of the management API for this endpoint,
    /// e.g. `https://abc123.execute-api.us-east-1.amazonaws.com/production`.
    pub fn url(&self, scheme: &str) -> String {
        format!("{scheme}://{}/{}", self.domain_name, self.stage)
    }
}

/// One registry entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub connection_id: ConnectionId,
    pub endpoint: RoutingEndpoint,
}

impl Connection {
    pub fn new(connection_id: ConnectionId, endpoint: RoutingEndpoint) -> Self {
        Connection {
            connection_id,
            endpoint,
        }
    }
}

impl From<connections::Model> for Connection {
    fn from(model: connections::Model) -> Self {
        Connection {
            connection_id: ConnectionId(model.connection_id),
            endpoint: RoutingEndpoint {
                domain_name: model.domain_name,
                stage: model.stage,
            },
        }
    }
}
