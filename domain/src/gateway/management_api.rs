//! Client for the WebSocket gateway's connection management API.
//!
//! A payload is delivered by POSTing it to
//! `{scheme}://{domainName}/{stage}/@connections/{connectionId}`. The gateway
//! answers 410 Gone once the connection has been closed.
//!
//! Requests are not signed. The client targets an endpoint that accepts
//! unauthenticated posts, such as a gateway-compatible service on a private
//! network or a signing proxy placed in front of the real gateway. A 401 or
//! 403 means that setup is wrong, so it is reported as `Rejected` and logged
//! at error level instead of being treated as a per-connection failure.

use super::transport::Transport;
use crate::connection::{ConnectionId, RoutingEndpoint};
use crate::error::Error;
use async_trait::async_trait;
use log::*;
use reqwest::StatusCode;
use std::time::Duration;

pub struct ManagementApiClient {
    client: reqwest::Client,
    scheme: String,
}

impl ManagementApiClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(scheme: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            scheme: scheme.to_string(),
        })
    }

    fn connection_url(&self, connection_id: &ConnectionId, endpoint: &RoutingEndpoint) -> String {
        format!(
            "{}/@connections/{}",
            endpoint.url(&self.scheme),
            urlencoding::encode(connection_id.as_str())
        )
    }
}

#[async_trait]
impl Transport for ManagementApiClient {
    async fn send(
        &self,
        connection_id: &ConnectionId,
        endpoint: &RoutingEndpoint,
        payload: &[u8],
    ) -> Result<(), Error> {
        let url = self.connection_url(connection_id, endpoint);

        let response = self
            .client
            .post(&url)
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| {
                debug!("Post to connection {connection_id} failed: {e:?}");
                Error::transient(format!("post to {url} failed: {e}"))
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::GONE => Err(Error::target_gone(format!(
                "connection {connection_id} is gone"
            ))),
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                error!("Management API at {url} refused an unsigned post with {status}");
                Err(Error::rejected(format!(
                    "post to connection {connection_id} was refused with {status}"
                )))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::transient(format!(
                    "post to connection {connection_id} returned {status}: {body}"
                )))
            }
        }
    }
}
