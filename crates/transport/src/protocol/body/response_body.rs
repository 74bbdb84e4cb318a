use std::fmt;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};

use crate::protocol::body::{BodyError, CloseBody};

/// The body of a response handed to callers.
///
/// The size hint of a `ResponseBody` is its declared length: exact for in-memory bodies and
/// for payloads framed by `Content-Length`, unknown otherwise.
pub struct ResponseBody {
    inner: Kind,
}

enum Kind {
    Once(Option<Bytes>),
    Stream(Pin<Box<dyn CloseBody + Send + Sync>>),
    Closed,
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self { inner: Kind::Once(None) }
    }

    pub fn once(bytes: Bytes) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }
        Self { inner: Kind::Once(Some(bytes)) }
    }

    pub fn stream<B>(body: B) -> Self
    where
        B: CloseBody + Send + Sync + 'static,
    {
        Self { inner: Kind::Stream(Box::pin(body)) }
    }

    /// Closes the body and every layer beneath it.
    ///
    /// The first call releases the body; later calls are no-ops returning `Ok(())`.
    pub fn close(&mut self) -> Result<(), BodyError> {
        match mem::replace(&mut self.inner, Kind::Closed) {
            Kind::Stream(mut body) => body.as_mut().close(),
            Kind::Once(_) | Kind::Closed => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.inner, Kind::Closed)
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Kind::Once(bytes) => f.debug_tuple("ResponseBody::Once").field(bytes).finish(),
            Kind::Stream(_) => f.write_str("ResponseBody::Stream"),
            Kind::Closed => f.write_str("ResponseBody::Closed"),
        }
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        Self::once(bytes)
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(value: Vec<u8>) -> Self {
        Self::once(Bytes::from(value))
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        Self::once(Bytes::from(value))
    }
}

impl From<&'static str> for ResponseBody {
    fn from(value: &'static str) -> Self {
        Self::once(Bytes::from_static(value.as_bytes()))
    }
}

impl From<()> for ResponseBody {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

impl HttpBody for ResponseBody {
    type Data = Bytes;
    type Error = BodyError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match &mut self.get_mut().inner {
            Kind::Once(option_bytes) => Poll::Ready(option_bytes.take().map(|bytes| Ok(Frame::data(bytes)))),
            Kind::Stream(body) => body.as_mut().poll_frame(cx),
            Kind::Closed => Poll::Ready(Some(Err(BodyError::Closed))),
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.inner {
            Kind::Once(option_bytes) => option_bytes.is_none(),
            Kind::Stream(body) => body.is_end_stream(),
            Kind::Closed => false,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match &self.inner {
            Kind::Once(None) => SizeHint::with_exact(0),
            Kind::Once(Some(bytes)) => SizeHint::with_exact(bytes.len() as u64),
            Kind::Stream(body) => body.size_hint(),
            Kind::Closed => SizeHint::default(),
        }
    }
}

impl CloseBody for ResponseBody {
    fn close(self: Pin<&mut Self>) -> Result<(), BodyError> {
        ResponseBody::close(self.get_mut())
    }
}
