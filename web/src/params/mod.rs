//! Typed parameters for endpoint inputs.
//!
//! Deserializing into these types rejects malformed requests before they
//! reach the relay.

pub(crate) mod event;
