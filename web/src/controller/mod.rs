use serde::Serialize;
pub(crate) mod event_controller;
pub(crate) mod health_check_controller;

/// Reply body for gateway events, `{"statusCode": 200, "body": "Connected"}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventReply {
    status_code: u16,
    body: String,
}

impl EventReply {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }
}
