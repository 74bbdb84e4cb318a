//! HTTP/1.1 client codecs
//!
//! - [`RequestEncoder`]: serializes a request head and its payload
//! - [`ResponseDecoder`]: parses a response head and its payload
//!
//! Both work on [`Message`](crate::protocol::Message)s and plug into
//! `tokio_util::codec::{FramedWrite, FramedRead}`.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use http::Method;
//! use micro_transport::codec::ResponseDecoder;
//! use micro_transport::protocol::Message;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = ResponseDecoder::new(Method::GET);
//! let mut buffer = BytesMut::from("HTTP/1.1 204 No Content\r\n\r\n");
//!
//! let message = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert!(matches!(message, Message::Header(_)));
//! ```

mod body;
mod header;
mod request_encoder;
mod response_decoder;

pub use request_encoder::RequestEncoder;
pub use response_decoder::ResponseDecoder;
