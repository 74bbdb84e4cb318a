//! Encoder for request payloads.
//!
//! A body with a known size is written as-is after the head, a body of unknown size
//! is written with chunked transfer coding.

use std::io::Write;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

use crate::codec::header::BufWriter;
use crate::protocol::{PayloadItem, PayloadSize, SendError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
    finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// remaining bytes of a content-length payload
    Length(u64),
    Chunked,
    NoBody,
}

impl PayloadEncoder {
    pub fn is_finish(&self) -> bool {
        self.finished
    }
}

impl From<PayloadSize> for PayloadEncoder {
    fn from(payload_size: PayloadSize) -> Self {
        let kind = match payload_size {
            PayloadSize::Length(length) => Kind::Length(length),
            PayloadSize::Chunked => Kind::Chunked,
            PayloadSize::Empty | PayloadSize::UntilClose => Kind::NoBody,
        };
        Self { kind, finished: false }
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.finished {
            warn!("encode payload_item but the payload is already finished");
            return Ok(());
        }

        match (&mut self.kind, item) {
            (Kind::Length(remaining), PayloadItem::Chunk(bytes)) => {
                let len = bytes.remaining() as u64;
                if len > *remaining {
                    return Err(SendError::invalid_body(format!("body exceeds declared length by {} bytes", len - *remaining)));
                }
                *remaining -= len;
                dst.put(bytes);
            }
            (Kind::Length(remaining), PayloadItem::Eof) => {
                if *remaining != 0 {
                    return Err(SendError::invalid_body(format!("body ended {remaining} bytes short of declared length")));
                }
                self.finished = true;
            }

            (Kind::Chunked, PayloadItem::Chunk(bytes)) => {
                if !bytes.has_remaining() {
                    return Ok(());
                }
                write!(BufWriter(dst), "{:X}\r\n", bytes.remaining())?;
                dst.reserve(bytes.remaining() + 2);
                dst.put(bytes);
                dst.put_slice(b"\r\n");
            }
            (Kind::Chunked, PayloadItem::Eof) => {
                self.finished = true;
                dst.extend_from_slice(b"0\r\n\r\n");
            }

            (Kind::NoBody, PayloadItem::Chunk(bytes)) if bytes.has_remaining() => {
                return Err(SendError::invalid_body("received data for a request without body"));
            }
            (Kind::NoBody, PayloadItem::Chunk(_)) => {}
            (Kind::NoBody, PayloadItem::Eof) => self.finished = true,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn encode(encoder: &mut PayloadEncoder, items: Vec<PayloadItem>) -> Result<BytesMut, SendError> {
        let mut dst = BytesMut::new();
        for item in items {
            encoder.encode(item, &mut dst)?;
        }
        Ok(dst)
    }

    #[test]
    fn chunked() {
        let mut encoder = PayloadEncoder::from(PayloadSize::Chunked);
        let items = vec![
            PayloadItem::Chunk(Bytes::from_static(b"hello world!")),
            PayloadItem::Chunk(Bytes::new()),
            PayloadItem::Eof,
        ];

        let dst = encode(&mut encoder, items).unwrap();
        assert_eq!(&dst[..], b"C\r\nhello world!\r\n0\r\n\r\n");
        assert!(encoder.is_finish());
    }

    #[test]
    fn fixed_length() {
        let mut encoder = PayloadEncoder::from(PayloadSize::Length(6));
        let items = vec![PayloadItem::Chunk(Bytes::from_static(b"foo")), PayloadItem::Chunk(Bytes::from_static(b"bar")), PayloadItem::Eof];

        let dst = encode(&mut encoder, items).unwrap();
        assert_eq!(&dst[..], b"foobar");
        assert!(encoder.is_finish());
    }

    #[test]
    fn length_mismatch() {
        let mut encoder = PayloadEncoder::from(PayloadSize::Length(2));
        assert!(encode(&mut encoder, vec![PayloadItem::Chunk(Bytes::from_static(b"foo"))]).is_err());

        let mut encoder = PayloadEncoder::from(PayloadSize::Length(4));
        assert!(encode(&mut encoder, vec![PayloadItem::Chunk(Bytes::from_static(b"foo")), PayloadItem::Eof]).is_err());
    }
}
