//! An asynchronous micro HTTP client transport
//!
//! This crate provides the request-execution contract used by the micro client stack,
//! the streaming body types that flow through it, and a lightweight HTTP/1.1 transport
//! built on top of tokio that is used whenever no other transport is configured.
//!
//! # Features
//!
//! - A pluggable [`transport::Transport`] trait, so transports can be decorated and chained
//! - Streaming response bodies that can be closed explicitly ([`protocol::body::CloseBody`])
//! - Chunked, fixed-length and read-until-close response payloads
//! - Chunked or fixed-length request payloads
//!
//! # Example
//!
//! ```no_run
//! use http::Request;
//! use http_body_util::BodyExt;
//! use micro_transport::protocol::body::RequestBody;
//! use micro_transport::transport::{DefaultTransport, Transport};
//!
//! #[tokio::main]
//! async fn main() {
//!     let transport = DefaultTransport::shared();
//!
//!     let request = Request::get("http://127.0.0.1:8080/").body(RequestBody::empty()).unwrap();
//!     let response = transport.round_trip(request).await.unwrap();
//!
//!     let bytes = response.into_body().collect().await.unwrap().to_bytes();
//!     println!("{}", String::from_utf8_lossy(&bytes));
//! }
//! ```
//!
//! # Architecture
//!
//! - [`transport`]: the `Transport` contract and the default HTTP/1.1 implementation
//! - [`connection`]: a single client connection, sending one request and reading its response
//! - [`protocol`]: message types, body types and errors
//! - [`codec`]: request encoding and response decoding
//!
//! # Limitations
//!
//! - HTTP/1.1 only
//! - No TLS support, only `http://` URIs are accepted by the default transport
//! - One connection per request, connections are not pooled
//! - Maximum response header size: 8KB
//! - Maximum number of response headers: 64

pub mod codec;
pub mod connection;
pub mod protocol;
pub mod transport;

mod utils;
pub(crate) use utils::ensure;
