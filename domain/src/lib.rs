//! Relay domain: connection registry, lifecycle, broadcast fanout and the
//! transports that carry messages to clients.
//!
//! Consumers of the `domain` crate work with [`connection::Connection`] and
//! never need the `entity_api` row types directly; the table model is
//! re-exported for the few places that map rows.

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::connections;

pub mod connection;
pub mod envelope;
pub mod error;
pub mod eviction;
pub mod fanout;
pub mod gateway;
pub mod lifecycle;
pub mod registry;
pub mod relay;
pub mod route;

#[cfg(test)]
pub(crate) mod testing;
