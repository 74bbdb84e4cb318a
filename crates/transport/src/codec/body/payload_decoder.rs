//! Decoder for response payloads.
//!
//! Picks the framing strategy from the [`PayloadSize`] the head decoder determined:
//! a fixed length, chunked transfer coding, everything until the server closes the
//! connection, or no payload at all.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::protocol::{ParseError, PayloadItem, PayloadSize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Length(LengthDecoder),
    Chunked(ChunkedDecoder),
    /// read until the connection is closed, `true` once eof was reported
    UntilClose(bool),
    NoBody,
}

impl PayloadDecoder {
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    pub fn until_close() -> Self {
        Self { kind: Kind::UntilClose(false) }
    }
}

impl From<PayloadSize> for PayloadDecoder {
    fn from(payload_size: PayloadSize) -> Self {
        match payload_size {
            PayloadSize::Length(size) => PayloadDecoder::fix_length(size),
            PayloadSize::Chunked => PayloadDecoder::chunked(),
            PayloadSize::UntilClose => PayloadDecoder::until_close(),
            PayloadSize::Empty => PayloadDecoder::empty(),
        }
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
            Kind::UntilClose(_) if src.is_empty() => Ok(None),
            Kind::UntilClose(_) => Ok(Some(PayloadItem::Chunk(src.split().freeze()))),
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }

    /// Called once the server closed the connection.
    ///
    /// Only a read-until-close payload ends cleanly here; for the other framings the
    /// payload is incomplete and an error is returned.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }

        match &mut self.kind {
            Kind::UntilClose(true) => Ok(None),
            Kind::UntilClose(eof) => {
                trace!("connection closed, finished reading payload");
                *eof = true;
                Ok(Some(PayloadItem::Eof))
            }
            Kind::Length(length_decoder) => Err(ParseError::invalid_body(format!(
                "connection closed with {} payload bytes outstanding",
                length_decoder.remaining()
            ))),
            Kind::Chunked(_) => Err(ParseError::invalid_body("connection closed inside chunked payload")),
            Kind::NoBody => Ok(None),
        }
    }
}
