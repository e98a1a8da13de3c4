pub mod prelude;

pub mod connections;

/// Type of the `connection_id` primary key. Ids are opaque strings issued by
/// the transport, not generated by the database.
pub type ConnectionKey = String;
