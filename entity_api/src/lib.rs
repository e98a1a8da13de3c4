pub use entity::{connections, ConnectionKey};

pub mod connection;
pub mod error;
