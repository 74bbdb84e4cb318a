use std::fmt;

use http::Response;
use micro_transport::protocol::body::{BodyError, ResponseBody};
use thiserror::Error;

use crate::coding::ContentCoding;

/// Errors returned by [`Decompress`](crate::Decompress), generic over the inner transport error.
#[derive(Debug, Error)]
pub enum DecompressError<E> {
    /// the inner transport failed, nothing was decoded
    #[error(transparent)]
    Transport(E),

    #[error("decompress: create {coding} decoder: {source}")]
    Decoder { coding: ContentCoding, source: BodyError },

    #[error(transparent)]
    UnsupportedEncoding(Box<UnsupportedEncoding>),
}

impl<E> DecompressError<E> {
    pub fn unsupported_encoding(&self) -> Option<&UnsupportedEncoding> {
        match self {
            Self::UnsupportedEncoding(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> From<UnsupportedEncoding> for DecompressError<E> {
    fn from(e: UnsupportedEncoding) -> Self {
        Self::UnsupportedEncoding(Box::new(e))
    }
}

/// A `Content-Encoding` token that can not be decoded.
///
/// Carries the response exactly as the inner transport returned it, headers and an
/// unread body included, so the caller can still deal with it.
#[derive(Error)]
#[error("decompress: unsupported content encoding `{encoding}`")]
pub struct UnsupportedEncoding {
    encoding: String,
    original: Response<ResponseBody>,
}

impl UnsupportedEncoding {
    pub fn new(encoding: impl Into<String>, original: Response<ResponseBody>) -> Self {
        Self { encoding: encoding.into(), original }
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn original(&self) -> &Response<ResponseBody> {
        &self.original
    }

    pub fn original_mut(&mut self) -> &mut Response<ResponseBody> {
        &mut self.original
    }

    pub fn into_original(self) -> Response<ResponseBody> {
        self.original
    }
}

impl fmt::Debug for UnsupportedEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnsupportedEncoding")
            .field("encoding", &self.encoding)
            .field("status", &self.original.status())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    type Error = DecompressError<io::Error>;

    #[test]
    fn messages() {
        let error = Error::Transport(io::Error::other("connection refused"));
        assert_eq!(error.to_string(), "connection refused");
        assert!(error.unsupported_encoding().is_none());

        let error = Error::Decoder {
            coding: ContentCoding::Gzip,
            source: BodyError::io(io::Error::new(io::ErrorKind::InvalidData, "invalid gzip header")),
        };
        assert_eq!(error.to_string(), "decompress: create gzip decoder: io error: invalid gzip header");

        let error = Error::from(UnsupportedEncoding::new("compress", Response::new(ResponseBody::empty())));
        assert_eq!(error.to_string(), "decompress: unsupported content encoding `compress`");
        assert_eq!(error.unsupported_encoding().map(UnsupportedEncoding::encoding), Some("compress"));
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<Error>();
    }
}
