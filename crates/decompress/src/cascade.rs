//! The cascading decompressed body.
//!
//! Each [`CascadeBody`] owns one decoder and the body beneath it. Stacking one layer per
//! content coding gives a chain whose outermost layer yields plaintext, and closing that
//! layer closes the whole chain down to the connection.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::{Bytes, BytesMut};
use http_body::{Body, Frame, SizeHint};
use http_body_util::BodyExt;
use micro_transport::protocol::body::{BodyError, CloseBody, ResponseBody};
use tracing::trace;

use crate::coding::ContentCoding;
use crate::decoder::{Decode, Decoder};

/// Fixed part of a gzip member header, refer: <https://www.rfc-editor.org/rfc/rfc1952#section-2.3>
const GZIP_HEADER_LEN: usize = 10;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const GZIP_CM_DEFLATE: u8 = 8;

/// A body layer decoding the body beneath it.
pub struct CascadeBody<D> {
    /// `None` once the decoder has been finished
    decoder: Option<D>,
    inner: ResponseBody,
    /// plaintext decoded before the first read
    pending: Option<Bytes>,
    inner_eof: bool,
    closed: bool,
}

impl CascadeBody<Decoder> {
    /// Stacks a decoding layer for `coding` on top of `inner`.
    ///
    /// For gzip the member header is read and validated here, so a body that is not gzip
    /// at all fails before it is handed out.
    pub async fn new(coding: ContentCoding, inner: ResponseBody) -> Result<Self, BodyError> {
        let decoder = Decoder::new(coding);
        match coding {
            ContentCoding::Gzip => Self::with_gzip_header(decoder, inner).await,
            ContentCoding::Deflate | ContentCoding::Br => Ok(Self::with_decoder(decoder, inner)),
        }
    }
}

impl<D: Decode> CascadeBody<D> {
    pub fn with_decoder(decoder: D, inner: ResponseBody) -> Self {
        Self { decoder: Some(decoder), inner, pending: None, inner_eof: false, closed: false }
    }

    async fn with_gzip_header(mut decoder: D, mut inner: ResponseBody) -> Result<Self, BodyError> {
        let primed = match read_gzip_header(&mut inner).await {
            Ok((header, inner_eof)) => {
                decoder.decode(&header).map(|pending| (pending, inner_eof)).map_err(|e| BodyError::decompress(decoder.name(), e))
            }
            Err(e) => Err(e),
        };

        match primed {
            Ok((pending, inner_eof)) => {
                Ok(Self { decoder: Some(decoder), inner, pending: Some(pending), inner_eof, closed: false })
            }
            // the layer is never handed out, so the body beneath is released here
            Err(e) => match inner.close() {
                Ok(()) => Err(e),
                Err(close_error) => Err(BodyError::Combined { outer: Box::new(e), inner: Box::new(close_error) }),
            },
        }
    }
}

/// Reads until the fixed gzip header is buffered, returns it with whether `inner` hit eof.
async fn read_gzip_header(inner: &mut ResponseBody) -> Result<(BytesMut, bool), BodyError> {
    let mut header = BytesMut::with_capacity(GZIP_HEADER_LEN);
    let mut inner_eof = false;

    while header.len() < GZIP_HEADER_LEN {
        match inner.frame().await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    header.extend_from_slice(&data);
                }
            }
            Some(Err(e)) => return Err(e),
            None => {
                inner_eof = true;
                break;
            }
        }
    }

    check_gzip_header(&header).map_err(BodyError::io)?;
    trace!(prefix = header.len(), "gzip header validated");
    Ok((header, inner_eof))
}

fn check_gzip_header(header: &[u8]) -> io::Result<()> {
    if header.len() < GZIP_HEADER_LEN {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "unexpected eof reading gzip header"));
    }
    if header[..2] != GZIP_MAGIC {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "invalid gzip header"));
    }
    if header[2] != GZIP_CM_DEFLATE {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "unsupported gzip compression method"));
    }
    Ok(())
}

impl<D: Decode> fmt::Debug for CascadeBody<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CascadeBody")
            .field("decoder", &self.decoder.as_ref().map(Decode::name))
            .field("inner", &self.inner)
            .field("inner_eof", &self.inner_eof)
            .field("closed", &self.closed)
            .finish()
    }
}

impl<D: Decode + Unpin> Body for CascadeBody<D> {
    type Data = Bytes;
    type Error = BodyError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.closed {
            return Poll::Ready(Some(Err(BodyError::Closed)));
        }

        if let Some(bytes) = this.pending.take().filter(|bytes| !bytes.is_empty()) {
            return Poll::Ready(Some(Ok(Frame::data(bytes))));
        }

        loop {
            let Some(decoder) = this.decoder.as_mut() else {
                return Poll::Ready(None);
            };

            if this.inner_eof {
                let name = decoder.name();
                let Some(decoder) = this.decoder.take() else {
                    return Poll::Ready(None);
                };
                trace!(encoding = name, "finish decoder");
                return match decoder.finish() {
                    Ok(bytes) if bytes.is_empty() => Poll::Ready(None),
                    Ok(bytes) => Poll::Ready(Some(Ok(Frame::data(bytes)))),
                    Err(e) => Poll::Ready(Some(Err(BodyError::decompress(name, e)))),
                };
            }

            match ready!(Pin::new(&mut this.inner).poll_frame(cx)) {
                Some(Ok(frame)) => {
                    // trailers carry no payload to decode
                    let Ok(data) = frame.into_data() else { continue };
                    match decoder.decode(&data) {
                        Ok(bytes) if bytes.is_empty() => continue,
                        Ok(bytes) => return Poll::Ready(Some(Ok(Frame::data(bytes)))),
                        Err(e) => return Poll::Ready(Some(Err(BodyError::decompress(decoder.name(), e)))),
                    }
                }
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => this.inner_eof = true,
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        !self.closed && self.decoder.is_none() && self.pending.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::default()
    }
}

impl<D: Decode + Unpin> CloseBody for CascadeBody<D> {
    /// Closes the decoder, then the body beneath, attempting both even when the first fails.
    fn close(self: Pin<&mut Self>) -> Result<(), BodyError> {
        let this = self.get_mut();
        if this.closed {
            return Ok(());
        }
        this.closed = true;
        this.pending = None;

        let decoder_result = match this.decoder.take() {
            Some(mut decoder) => decoder.close().map_err(|e| BodyError::decompress(decoder.name(), e)),
            None => Ok(()),
        };
        let inner_result = this.inner.close();

        BodyError::combine(decoder_result, inner_result)
    }
}
