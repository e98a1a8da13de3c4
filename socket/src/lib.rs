//! In-process WebSocket session table.
//!
//! Every socket accepted by the web server gets a session here: a bounded
//! outbound queue drained by that socket's writer task. The [`Manager`]
//! implements the domain `Transport`, so the fanout engine can deliver to
//! local sockets the same way it delivers through the gateway management API.
//!
//! # Delivery classification
//!
//! - No session for the id, or its writer has stopped: the target is gone.
//! - The session's queue is full: transient, the client is just slow.
//!
//! # Modules
//!
//! - `connection`: the session table keyed by connection id
//! - `manager`: session registration and the `Transport` implementation

pub mod connection;
pub mod manager;

pub use manager::Manager;
