//! Inbound and outbound message envelopes.
//!
//! Inbound frames are JSON objects carrying the application content under
//! `data`. Outbound frames come in two shapes: the acknowledgment sent only to
//! the sender, and the broadcast sent to every registered connection.

use crate::connection::ConnectionId;
use crate::error::Error;
use serde::Serialize;
use serde_json::Value;

/// Application content extracted from a well-formed inbound message.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundMessage {
    pub data: Value,
}

/// Parses a raw inbound body.
///
/// An absent body, non-JSON text, a document that is not an object, or a
/// missing or `null` `data` field are all invalid.
pub fn parse_inbound(raw: Option<&str>) -> Result<InboundMessage, Error> {
    let raw = raw.ok_or_else(|| Error::invalid_message("message body is absent"))?;

    let document: Value = serde_json::from_str(raw)
        .map_err(|e| Error::invalid_message(format!("message body is not JSON: {e}")))?;

    let Value::Object(mut fields) = document else {
        return Err(Error::invalid_message("message body is not a JSON object"));
    };

    match fields.remove("data") {
        None | Some(Value::Null) => Err(Error::invalid_message(
            "message body has no `data` field",
        )),
        Some(data) => Ok(InboundMessage { data }),
    }
}

/// Tells the sender which connection id the relay knows it by.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfAck<'a> {
    pub connection_id: &'a ConnectionId,
}

/// A message relayed on behalf of `from`.
#[derive(Debug, Serialize)]
pub struct Broadcast<'a> {
    pub from: &'a ConnectionId,
    pub message: &'a Value,
}

pub fn encode_self_ack(sender: &ConnectionId) -> Result<Vec<u8>, Error> {
    Ok(serde_json::to_vec(&SelfAck {
        connection_id: sender,
    })?)
}

pub fn encode_broadcast(sender: &ConnectionId, message: &InboundMessage) -> Result<Vec<u8>, Error> {
    Ok(serde_json::to_vec(&Broadcast {
        from: sender,
        message: &message.data,
    })?)
}
