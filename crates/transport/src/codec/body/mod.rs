//! Payload framing for the client side
//!
//! - [`PayloadEncoder`]: writes request payloads with `Content-Length` or chunked framing
//! - [`PayloadDecoder`]: reads response payloads framed by `Content-Length`, chunked
//!   transfer coding, or the connection closing

mod chunked_decoder;
mod length_decoder;
mod payload_decoder;
mod payload_encoder;

pub use payload_decoder::PayloadDecoder;
pub use payload_encoder::PayloadEncoder;
