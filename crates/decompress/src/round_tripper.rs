//! The decompressing transport decorator.

use std::sync::Arc;

use async_trait::async_trait;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH};
use http::{Request, Response};
use http_body::Body;
use micro_transport::protocol::body::{BodyError, RequestBody, ResponseBody};
use micro_transport::transport::{DefaultTransport, Transport};
use tracing::{debug, trace};

use crate::cascade::CascadeBody;
use crate::coding::{ContentCoding, EncodingChain};
use crate::error::{DecompressError, UnsupportedEncoding};

/// Marks a response whose body was decompressed, stored in the response extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decompressed;

/// Accessors for the metadata [`Decompress`] rewrites.
pub trait ResponseExt {
    /// Whether the body was decompressed on the way in.
    fn is_decompressed(&self) -> bool;

    /// The declared body length, `None` when unknown.
    fn content_length(&self) -> Option<u64>;
}

impl ResponseExt for Response<ResponseBody> {
    fn is_decompressed(&self) -> bool {
        self.extensions().get::<Decompressed>().is_some()
    }

    fn content_length(&self) -> Option<u64> {
        self.body().size_hint().exact()
    }
}

/// A [`Transport`] decorator that decodes `Content-Encoding` compressed responses.
///
/// Responses are handed back with a plaintext body. When decoding took place the
/// `Content-Encoding` and `Content-Length` headers are gone, the body length is unknown
/// and [`ResponseExt::is_decompressed`] reports `true`.
///
/// A response whose body is known to be empty (`HEAD`, `204`, `304`, `Content-Length: 0`)
/// is returned unchanged even when it names a coding: it keeps its `Content-Encoding`
/// header and [`ResponseExt::is_decompressed`] reports `false`.
#[derive(Debug, Clone)]
pub struct Decompress<T = Arc<DefaultTransport>> {
    inner: T,
}

impl Decompress {
    /// Decorates the process wide [`DefaultTransport`].
    pub fn new() -> Self {
        Self { inner: DefaultTransport::shared() }
    }
}

impl Default for Decompress {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Decompress<T> {
    pub fn wrap(inner: T) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for Decompress<T> {
    type Error = DecompressError<T::Error>;

    async fn round_trip(&self, request: Request<RequestBody>) -> Result<Response<ResponseBody>, Self::Error> {
        let response = self.inner.round_trip(request).await.map_err(DecompressError::Transport)?;
        decompress_response(response).await
    }
}

/// Replaces the body of `response` with a decoding body according to its `Content-Encoding`.
///
/// The header is resolved completely before the body is touched: on an unsupported token
/// the response comes back untouched inside [`UnsupportedEncoding`]. Responses without an
/// encoding to undo, or without a body, are returned as they are.
pub async fn decompress_response<E>(response: Response<ResponseBody>) -> Result<Response<ResponseBody>, DecompressError<E>> {
    let Some(chain) = EncodingChain::from_headers(response.headers()) else {
        return Ok(response);
    };

    let plan = match chain.resolve() {
        Ok(plan) => plan,
        Err(token) => {
            let encoding = token.to_owned();
            debug!(%encoding, "unsupported content encoding");
            return Err(UnsupportedEncoding::new(encoding, response).into());
        }
    };

    if plan.is_empty() {
        trace!(tokens = ?chain.tokens(), "identity content encoding, nothing to decode");
        return Ok(response);
    }

    if response.body().size_hint().exact() == Some(0) {
        trace!(tokens = ?chain.tokens(), "empty body, nothing to decode");
        return Ok(response);
    }

    debug!(?plan, "decompress response");
    let (mut parts, mut body) = response.into_parts();
    for coding in plan {
        let layer = CascadeBody::new(coding, body).await.map_err(|source| {
            // reading the gzip header may surface the failure of a layer beneath
            let coding = match &source {
                BodyError::Decompress { encoding, .. } => ContentCoding::from_name(encoding).unwrap_or(coding),
                _ => coding,
            };
            DecompressError::Decoder { coding, source }
        })?;
        body = ResponseBody::stream(layer);
    }

    parts.headers.remove(CONTENT_ENCODING);
    parts.headers.remove(CONTENT_LENGTH);
    parts.extensions.insert(Decompressed);
    Ok(Response::from_parts(parts, body))
}
