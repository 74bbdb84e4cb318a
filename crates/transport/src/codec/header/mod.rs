//! HTTP head processing for the client side
//!
//! - [`HeaderEncoder`]: serializes a request head, setting `Content-Length` or
//!   `Transfer-Encoding` to match the request payload
//! - [`HeaderDecoder`]: parses a response head and determines how its payload is delimited

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
pub(crate) use header_encoder::BufWriter;
