use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use http_body::{Body as HttpBody, Frame, SizeHint};
use tracing::{debug, trace};

use crate::protocol::body::{BodyError, CloseBody};
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, ResponseHeader};

/// The raw payload of a response, streamed from the connection it arrived on.
///
/// `PayloadBody` owns the connection: the decoded message stream `S` and the write half
/// `W`, which is only held so the connection stays open until the body is closed or
/// dropped.
pub struct PayloadBody<S, W> {
    stream: Option<S>,
    writer: Option<W>,
    payload_size: PayloadSize,
    received: u64,
    eof: bool,
}

impl<S, W> PayloadBody<S, W> {
    pub fn new(stream: S, writer: W, payload_size: PayloadSize) -> Self {
        Self { stream: Some(stream), writer: Some(writer), payload_size, received: 0, eof: payload_size.is_empty() }
    }
}

impl<S, W> fmt::Debug for PayloadBody<S, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadBody")
            .field("payload_size", &self.payload_size)
            .field("received", &self.received)
            .field("eof", &self.eof)
            .field("closed", &self.stream.is_none())
            .finish()
    }
}

impl<S, W> HttpBody for PayloadBody<S, W>
where
    S: Stream<Item = Result<Message<(ResponseHeader, PayloadSize)>, ParseError>> + Unpin,
    W: Unpin,
{
    type Data = Bytes;
    type Error = BodyError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let Some(stream) = this.stream.as_mut() else {
            return Poll::Ready(Some(Err(BodyError::Closed)));
        };

        if this.eof {
            return Poll::Ready(None);
        }

        match ready!(stream.poll_next_unpin(cx)) {
            Some(Ok(Message::Payload(PayloadItem::Chunk(bytes)))) => {
                this.received += bytes.len() as u64;
                Poll::Ready(Some(Ok(Frame::data(bytes))))
            }
            Some(Ok(Message::Payload(PayloadItem::Eof))) => {
                trace!(received = this.received, "finished reading response body");
                this.eof = true;
                Poll::Ready(None)
            }
            Some(Ok(Message::Header(_))) => {
                Poll::Ready(Some(Err(ParseError::invalid_body("received header while reading response body").into())))
            }
            Some(Err(e)) => Poll::Ready(Some(Err(e.into()))),
            None => Poll::Ready(Some(Err(
                ParseError::invalid_body("connection closed before response body was complete").into()
            ))),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.eof && self.stream.is_some()
    }

    fn size_hint(&self) -> SizeHint {
        match self.payload_size {
            PayloadSize::Length(length) => SizeHint::with_exact(length.saturating_sub(self.received)),
            payload_size => payload_size.into(),
        }
    }
}

impl<S, W> CloseBody for PayloadBody<S, W>
where
    S: Stream<Item = Result<Message<(ResponseHeader, PayloadSize)>, ParseError>> + Unpin,
    W: Unpin,
{
    fn close(self: Pin<&mut Self>) -> Result<(), BodyError> {
        let this = self.get_mut();
        if this.stream.take().is_some() && !this.eof {
            debug!(received = this.received, "response body closed before eof, dropping connection");
        }
        this.writer.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use http_body_util::BodyExt;

    type Item = Result<Message<(ResponseHeader, PayloadSize)>, ParseError>;

    fn payload(items: Vec<Item>) -> stream::Iter<std::vec::IntoIter<Item>> {
        stream::iter(items)
    }

    #[tokio::test]
    async fn read_until_eof() {
        let items = vec![
            Ok(Message::from(Bytes::from_static(b"foo"))),
            Ok(Message::from(Bytes::from_static(b"bar"))),
            Ok(Message::Payload(PayloadItem::Eof)),
        ];
        let body = PayloadBody::new(payload(items), (), PayloadSize::Length(6));
        assert_eq!(body.size_hint().exact(), Some(6));

        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(bytes, Bytes::from_static(b"foobar"));
    }

    #[tokio::test]
    async fn connection_closed_early() {
        let items = vec![Ok(Message::from(Bytes::from_static(b"foo")))];
        let mut body = PayloadBody::new(payload(items), (), PayloadSize::Chunked);

        assert!(body.frame().await.unwrap().is_ok());
        assert!(matches!(body.frame().await, Some(Err(BodyError::Payload { .. }))));
    }

    #[tokio::test]
    async fn read_after_close() {
        let items = vec![Ok(Message::from(Bytes::from_static(b"foo")))];
        let mut body = PayloadBody::new(payload(items), (), PayloadSize::UntilClose);

        Pin::new(&mut body).close().unwrap();
        Pin::new(&mut body).close().unwrap();

        assert!(matches!(body.frame().await, Some(Err(BodyError::Closed))));
    }

    #[tokio::test]
    async fn empty_payload() {
        let mut body = PayloadBody::new(payload(vec![]), (), PayloadSize::Empty);

        assert!(body.is_end_stream());
        assert!(body.frame().await.is_none());
    }
}
