//! Decoder for payloads framed by `Content-Length`.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::protocol::{ParseError, PayloadItem};

/// Yields chunks until the declared number of bytes has been read, then `Eof`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.remaining == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let len = self.remaining.min(src.len() as u64);
        let bytes = src.split_to(len as usize).freeze();

        self.remaining -= len;
        Ok(Some(PayloadItem::Chunk(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_declared_length() {
        let mut buffer = BytesMut::from(&b"foobarbazHTTP/1.1"[..]);
        let mut decoder = LengthDecoder::new(9);

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(item.as_bytes().unwrap().as_ref(), b"foobarbaz");
        assert_eq!(decoder.remaining(), 0);
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
        assert_eq!(&buffer[..], b"HTTP/1.1");
    }

    #[test]
    fn waits_for_more_bytes() {
        let mut buffer = BytesMut::from(&b"foo"[..]);
        let mut decoder = LengthDecoder::new(6);

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_chunk());
        assert_eq!(decoder.remaining(), 3);
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
    }
}
