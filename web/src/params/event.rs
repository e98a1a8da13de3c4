use serde::Deserialize;

/// A gateway event as posted to `/events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventParams {
    pub(crate) request_context: RequestContext,
    #[serde(default)]
    pub(crate) body: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestContext {
    pub(crate) connection_id: String,
    pub(crate) route_key: String,
    /// Absent for lifecycle events from some gateways; falls back to the
    /// address of this instance.
    #[serde(default)]
    pub(crate) domain_name: Option<String>,
    #[serde(default)]
    pub(crate) stage: Option<String>,
}
