//! Transparent response decompression for micro transports
//!
//! [`Decompress`] decorates any [`Transport`](micro_transport::transport::Transport): it forwards
//! the request to the inner transport, looks at the `Content-Encoding` of the response and
//! replaces the body with one that yields the decoded bytes. Callers never see compressed data.
//!
//! # Features
//!
//! - `gzip`, `deflate` (raw deflate stream) and `br` content codings
//! - Stacked codings such as `Content-Encoding: gzip, br`, decoded right to left
//! - Lazy decoding, the body is decompressed chunk by chunk as it is read
//! - Closing the body closes every decoding layer and the connection beneath exactly once
//! - Unknown codings return the untouched response inside [`UnsupportedEncoding`]
//!
//! # Example
//!
//! ```no_run
//! use http::Request;
//! use http_body_util::BodyExt;
//! use micro_decompress::{Decompress, ResponseExt};
//! use micro_transport::protocol::body::RequestBody;
//! use micro_transport::transport::Transport;
//!
//! #[tokio::main]
//! async fn main() {
//!     let transport = Decompress::new();
//!
//!     let request = Request::get("http://127.0.0.1:8080/")
//!         .header("accept-encoding", "gzip, deflate, br")
//!         .body(RequestBody::empty())
//!         .unwrap();
//!     let response = transport.round_trip(request).await.unwrap();
//!     println!("decompressed: {}", response.is_decompressed());
//!
//!     let bytes = response.into_body().collect().await.unwrap().to_bytes();
//!     println!("{}", String::from_utf8_lossy(&bytes));
//! }
//! ```
//!
//! # Response metadata
//!
//! When a body was decoded the response no longer carries `Content-Encoding` or
//! `Content-Length`, its body length is unknown, and [`ResponseExt::is_decompressed`]
//! returns `true`. Responses without a coding to undo, `identity` only, or without a body
//! are returned unchanged.

mod cascade;
mod coding;
mod decoder;
mod error;
mod layer;
mod round_tripper;

#[cfg(test)]
mod test_util;

pub use cascade::CascadeBody;
pub use coding::{ContentCoding, EncodingChain};
pub use decoder::{Decode, Decoder};
pub use error::{DecompressError, UnsupportedEncoding};
pub use layer::DecompressLayer;
pub use round_tripper::{Decompress, Decompressed, ResponseExt, decompress_response};
