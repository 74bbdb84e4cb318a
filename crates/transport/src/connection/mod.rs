//! Client side connection handling
//!
//! - [`ClientConnection`]: writes one request to an established connection and reads
//!   the response head. The response payload keeps streaming from the connection
//!   through the returned body.

mod client_connection;

pub use client_connection::ClientConnection;
