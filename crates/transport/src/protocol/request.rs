//! HTTP request head handling.
//!
//! The head of an outgoing request is the standard `http::Request` with an empty
//! body placeholder; the body travels separately as payload items.

use http::Request;

/// Type alias for the head of an outgoing HTTP request.
pub type RequestHead = Request<()>;
