//! Decoder for incoming HTTP responses.
//!
//! Yields the response head first, then its payload items ending with
//! [`PayloadItem::Eof`]. Interim `1xx` responses are consumed and skipped, so the
//! head returned is always the final response to the request.

use bytes::BytesMut;
use http::{Method, StatusCode};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, ResponseHeader};

/// The decoder works in two phases, tracked by `payload_decoder`:
/// - `None`: reading the response head
/// - `Some(PayloadDecoder)`: reading the payload
#[derive(Debug)]
pub struct ResponseDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl ResponseDecoder {
    /// Creates a decoder for the response to a request with the given method.
    pub fn new(request_method: Method) -> Self {
        Self { header_decoder: HeaderDecoder::new(request_method), payload_decoder: None }
    }

    fn decode_payload(&mut self, item: Option<PayloadItem>) -> Option<Message<(ResponseHeader, PayloadSize)>> {
        if matches!(item, Some(PayloadItem::Eof)) {
            self.payload_decoder.take();
        }
        item.map(Message::Payload)
    }
}

impl Decoder for ResponseDecoder {
    type Item = Message<(ResponseHeader, PayloadSize)>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode(src)?;
            return Ok(self.decode_payload(item));
        }

        loop {
            let Some((header, payload_size)) = self.header_decoder.decode(src)? else {
                return Ok(None);
            };

            if header.is_informational() && header.status() != StatusCode::SWITCHING_PROTOCOLS {
                trace!(status = %header.status(), "skip interim response");
                continue;
            }

            self.payload_decoder = Some(PayloadDecoder::from(payload_size));
            return Ok(Some(Message::Header((header, payload_size))));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }

        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode_eof(src)?;
            return Ok(self.decode_payload(item));
        }

        if src.is_empty() {
            Ok(None)
        } else {
            Err(ParseError::invalid_header("connection closed before response head was complete"))
        }
    }
}
