//! HTTP header decoder for parsing response heads
//!
//! Parses the status line and header fields of a response with `httparse`, then decides
//! how the payload that follows is delimited.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB
//! - Only HTTP/1.0 and HTTP/1.1 responses are accepted

use bytes::BytesMut;
use http::{HeaderName, HeaderValue, Method, Response, StatusCode};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, PayloadSize, ResponseHeader};

/// Maximum number of headers allowed in a response
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Shortest possible status line plus the empty line: `HTTP/1.1 200\r\n\r\n`
const MIN_HEAD_BYTES: usize = 16;

/// Decoder for HTTP response heads.
///
/// The payload framing of a response depends on the request it answers (responses to
/// `HEAD` never carry a body), so the decoder is created for a request method.
#[derive(Debug, Clone)]
pub struct HeaderDecoder {
    request_method: Method,
}

impl HeaderDecoder {
    pub fn new(request_method: Method) -> Self {
        Self { request_method }
    }
}

impl Decoder for HeaderDecoder {
    type Item = (ResponseHeader, PayloadSize);
    type Error = ParseError;

    /// Decodes a response head from `src`, leaving any payload bytes in the buffer.
    ///
    /// Returns `Ok(None)` when more bytes are needed.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < MIN_HEAD_BYTES {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut resp = httparse::Response::new(&mut headers);

        let parsed_result = resp.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e.to_string()),
        });

        let body_offset = match parsed_result? {
            Status::Complete(body_offset) => body_offset,
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                return Ok(None);
            }
        };

        trace!(head_size = body_offset, "parsed response head");
        ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

        let version = match resp.version {
            Some(0) => http::Version::HTTP_10,
            Some(1) => http::Version::HTTP_11,
            _ => return Err(ParseError::InvalidVersion(resp.version)),
        };

        let status = resp
            .code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or(ParseError::InvalidStatus(resp.code))?;

        let header_count = resp.headers.len();
        let ranges = HeaderRange::record(src, resp.headers);

        let mut builder = Response::builder().status(status).version(version);
        let header_map = builder.headers_mut().ok_or_else(|| ParseError::invalid_header("can't build response head"))?;
        header_map.reserve(header_count);

        // header values are sliced out of the frozen head without copying
        let head_bytes = src.split_to(body_offset).freeze();
        for range in &ranges {
            let name = HeaderName::from_bytes(&head_bytes[range.name.0..range.name.1]).map_err(ParseError::invalid_header)?;
            let value = HeaderValue::from_maybe_shared(head_bytes.slice(range.value.0..range.value.1))
                .map_err(ParseError::invalid_header)?;
            header_map.append(name, value);
        }

        let header = ResponseHeader::from(builder.body(()).map_err(ParseError::invalid_header)?);
        let payload_size = parse_payload(&header, &self.request_method)?;

        Ok(Some((header, payload_size)))
    }
}

/// Byte ranges of a header's name and value within the head buffer.
#[derive(Clone, Copy)]
struct HeaderRange {
    name: (usize, usize),
    value: (usize, usize),
}

impl HeaderRange {
    fn record(bytes: &[u8], headers: &[httparse::Header<'_>]) -> Vec<HeaderRange> {
        let bytes_ptr = bytes.as_ptr() as usize;
        headers
            .iter()
            .map(|header| {
                let name_start = header.name.as_ptr() as usize - bytes_ptr;
                let value_start = header.value.as_ptr() as usize - bytes_ptr;
                HeaderRange {
                    name: (name_start, name_start + header.name.len()),
                    value: (value_start, value_start + header.value.len()),
                }
            })
            .collect()
    }
}

/// Determines how the response payload is delimited, refer: <https://www.rfc-editor.org/rfc/rfc9112#section-6.3>
fn parse_payload(header: &ResponseHeader, request_method: &Method) -> Result<PayloadSize, ParseError> {
    if !header.need_body(request_method) {
        return Ok(PayloadSize::Empty);
    }

    let te_header = header.headers().get(http::header::TRANSFER_ENCODING);
    let cl_header = header.headers().get(http::header::CONTENT_LENGTH);

    match (te_header, cl_header) {
        // transfer-encoding overrides content-length
        (Some(te_value), _) => {
            if is_chunked(te_value) {
                Ok(PayloadSize::Chunked)
            } else {
                Ok(PayloadSize::UntilClose)
            }
        }

        (None, Some(cl_value)) => {
            let cl_str = cl_value.to_str().map_err(|_| ParseError::invalid_content_length("value can't to_str"))?;

            let length = cl_str
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;

            if length == 0 { Ok(PayloadSize::Empty) } else { Ok(PayloadSize::Length(length)) }
        }

        (None, None) => Ok(PayloadSize::UntilClose),
    }
}

/// chunked must be the last transfer coding when present
fn is_chunked(header_value: &HeaderValue) -> bool {
    header_value
        .as_bytes()
        .rsplit(|b| *b == b',')
        .next()
        .is_some_and(|last| last.trim_ascii().eq_ignore_ascii_case(b"chunked"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Version;
    use indoc::indoc;

    fn decode(method: Method, str: &str) -> (ResponseHeader, PayloadSize, BytesMut) {
        let mut buf = BytesMut::from(str);
        let (header, payload_size) = HeaderDecoder::new(method).decode(&mut buf).unwrap().unwrap();
        (header, payload_size, buf)
    }

    #[test]
    fn check_is_chunked() {
        assert!(is_chunked(&HeaderValue::from_static("chunked")));
        assert!(is_chunked(&HeaderValue::from_static("gzip, chunked")));
        assert!(!is_chunked(&HeaderValue::from_static("chunked, gzip")));
        assert!(!is_chunked(&HeaderValue::from_static("gzip")));
    }

    #[test]
    fn from_nginx() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        Server: nginx/1.25.3
        Content-Type: text/html
        Content-Length: 9
        Content-Encoding: gzip

        foobarbaz"##};

        let (header, payload_size, rest) = decode(Method::GET, str);

        assert_eq!(header.status(), StatusCode::OK);
        assert_eq!(header.version(), Version::HTTP_11);
        assert_eq!(header.headers().len(), 4);
        assert_eq!(header.headers().get(http::header::SERVER), Some(&HeaderValue::from_static("nginx/1.25.3")));
        assert_eq!(header.headers().get(http::header::CONTENT_ENCODING), Some(&HeaderValue::from_static("gzip")));

        assert_eq!(payload_size, PayloadSize::Length(9));
        assert_eq!(&rest[..], b"foobarbaz");
    }

    #[test]
    fn chunked_wins_over_content_length() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        Transfer-Encoding: chunked
        Content-Length: 100

        "##};

        let (_, payload_size, _) = decode(Method::GET, str);
        assert_eq!(payload_size, PayloadSize::Chunked);
    }

    #[test]
    fn no_framing_reads_until_close() {
        let str = indoc! {r##"
        HTTP/1.0 200 OK
        Content-Type: text/plain

        "##};

        let (header, payload_size, _) = decode(Method::GET, str);
        assert_eq!(header.version(), Version::HTTP_10);
        assert_eq!(payload_size, PayloadSize::UntilClose);
    }

    #[test]
    fn bodiless_responses() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        Content-Length: 120

        "##};
        let (_, payload_size, _) = decode(Method::HEAD, str);
        assert_eq!(payload_size, PayloadSize::Empty);

        let str = indoc! {r##"
        HTTP/1.1 204 No Content
        Server: micro

        "##};
        let (_, payload_size, _) = decode(Method::DELETE, str);
        assert_eq!(payload_size, PayloadSize::Empty);
    }

    #[test]
    fn partial_head() {
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\nContent-Le");
        assert!(HeaderDecoder::new(Method::GET).decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn invalid_content_length() {
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\nContent-Length: ten\r\n\r\n");
        let result = HeaderDecoder::new(Method::GET).decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));
    }
}
