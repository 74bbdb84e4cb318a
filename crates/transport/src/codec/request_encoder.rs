//! Encoder for outgoing HTTP requests.
//!
//! Accepts a request head followed by its payload items. The head decides the payload
//! framing, and the payload encoder is dropped once the final item was written.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::codec::body::PayloadEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Message, PayloadSize, RequestHead, SendError};

#[derive(Debug)]
pub struct RequestEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
}

impl RequestEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for RequestEncoder {
    fn default() -> Self {
        Self { header_encoder: HeaderEncoder, payload_encoder: None }
    }
}

impl<D: Buf> Encoder<Message<(RequestHead, PayloadSize), D>> for RequestEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<(RequestHead, PayloadSize), D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Header((head, payload_size)) => {
                if self.payload_encoder.is_some() {
                    error!("expect payload item but receive request head");
                    return Err(SendError::invalid_body("request head sent before previous payload finished"));
                }

                self.payload_encoder = Some(PayloadEncoder::from(payload_size));
                self.header_encoder.encode((head, payload_size), dst)
            }

            Message::Payload(payload_item) => {
                let Some(payload_encoder) = &mut self.payload_encoder else {
                    error!("expect request head but receive payload item");
                    return Err(SendError::invalid_body("payload sent before request head"));
                };

                let result = payload_encoder.encode(payload_item, dst);
                if payload_encoder.is_finish() {
                    self.payload_encoder.take();
                }
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PayloadItem;
    use bytes::Bytes;
    use http::Request;

    #[test]
    fn head_then_chunked_payload() {
        let mut encoder = RequestEncoder::new();
        let mut dst = BytesMut::new();

        let head = Request::post("http://localhost/submit").header("host", "localhost").body(()).unwrap();
        encoder.encode(Message::<_, Bytes>::Header((head, PayloadSize::Chunked)), &mut dst).unwrap();
        encoder.encode(Message::<(RequestHead, PayloadSize), _>::Payload(PayloadItem::Chunk(Bytes::from_static(b"abc"))), &mut dst).unwrap();
        encoder.encode(Message::<(RequestHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof), &mut dst).unwrap();

        assert_eq!(
            &dst[..],
            &b"POST /submit HTTP/1.1\r\nhost: localhost\r\ntransfer-encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\n\r\n"[..]
        );
        assert!(encoder.payload_encoder.is_none());
    }

    #[test]
    fn payload_without_head() {
        let mut encoder = RequestEncoder::new();
        let item = Message::<(RequestHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof);
        assert!(encoder.encode(item, &mut BytesMut::new()).is_err());
    }
}
