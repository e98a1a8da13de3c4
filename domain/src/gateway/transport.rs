use crate::connection::{ConnectionId, RoutingEndpoint};
use crate::error::Error;
use async_trait::async_trait;

/// Pushes one payload to one connection.
///
/// Implementations classify failures with the delivery error kinds:
/// `TargetGone` when the session no longer exists, `Rejected` when the
/// endpoint refused the relay's credentials, `Transient` for anything else
/// that might succeed on a later attempt. Only `TargetGone` evicts.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        connection_id: &ConnectionId,
        endpoint: &RoutingEndpoint,
        payload: &[u8],
    ) -> Result<(), Error>;
}
