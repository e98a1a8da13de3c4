//! WebSocket endpoint for clients connecting directly to this server.
//!
//! The session table and delivery queues live in the `socket` crate; this
//! module only bridges an upgraded socket to the relay.

pub mod handler;
