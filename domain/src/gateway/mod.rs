//! Outbound delivery to connected clients.

pub mod management_api;
pub mod transport;

pub use management_api::ManagementApiClient;
pub use transport::Transport;
