//! HTTP header encoder for serializing request heads
//!
//! Writes the request line in origin-form followed by the header fields, and keeps the
//! `Content-Length` / `Transfer-Encoding` headers consistent with the payload that follows.

use std::io::{self, Write};

use bytes::{BufMut, BytesMut};
use http::{HeaderValue, Method, Version, header};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{PayloadSize, RequestHead, SendError};

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 1024;

const CHUNKED: HeaderValue = HeaderValue::from_static("chunked");
const ZERO: HeaderValue = HeaderValue::from_static("0");

/// Encoder for HTTP request heads.
#[derive(Debug)]
pub struct HeaderEncoder;

impl Encoder<(RequestHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (RequestHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut head, payload_size) = item;

        dst.reserve(INIT_HEADER_SIZE);

        let version = match head.version() {
            Version::HTTP_11 => "HTTP/1.1",
            Version::HTTP_10 => "HTTP/1.0",
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(io::Error::from(io::ErrorKind::Unsupported).into());
            }
        };

        let target = head.uri().path_and_query().map_or("/", |path_and_query| path_and_query.as_str());
        write!(BufWriter(dst), "{} {} {}\r\n", head.method(), target, version)?;

        let announce_empty = expects_payload(head.method());
        let headers = head.headers_mut();
        match payload_size {
            PayloadSize::Length(n) => {
                headers.remove(header::TRANSFER_ENCODING);
                headers.insert(header::CONTENT_LENGTH, n.into());
            }
            PayloadSize::Chunked => {
                headers.remove(header::CONTENT_LENGTH);
                headers.insert(header::TRANSFER_ENCODING, CHUNKED);
            }
            PayloadSize::Empty | PayloadSize::UntilClose => {
                headers.remove(header::TRANSFER_ENCODING);
                if announce_empty {
                    headers.insert(header::CONTENT_LENGTH, ZERO);
                } else {
                    headers.remove(header::CONTENT_LENGTH);
                }
            }
        }

        for (name, value) in head.headers() {
            dst.put_slice(name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// methods whose requests are expected to carry content, so an empty body is announced
fn expects_payload(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Adapts a `BytesMut` to `io::Write` for formatted output.
pub(crate) struct BufWriter<'a>(pub(crate) &'a mut BytesMut);

impl Write for BufWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
