use std::fmt;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use http::{Request, Response};
use http_body::Body;
use http_body_util::BodyExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, trace};

use crate::codec::{RequestEncoder, ResponseDecoder};
use crate::protocol::body::{PayloadBody, RequestBody, ResponseBody};
use crate::protocol::{HttpError, Message, ParseError, PayloadItem, PayloadSize, RequestHead, SendError};

/// Default capacity of the read buffer
pub const DEFAULT_READ_CAPACITY: usize = 8 * 1024;

/// A single HTTP/1.1 client connection used for one request.
///
/// # Type Parameters
///
/// * `R`: The async readable half of the connection
/// * `W`: The async writable half of the connection
pub struct ClientConnection<R, W> {
    framed_read: FramedRead<R, ResponseDecoder>,
    framed_write: FramedWrite<W, RequestEncoder>,
}

impl<R, W> fmt::Debug for ClientConnection<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConnection").field("decoder", self.framed_read.decoder()).finish_non_exhaustive()
    }
}

impl<R, W> ClientConnection<R, W>
where
    R: AsyncRead + Unpin + Send + Sync + 'static,
    W: AsyncWrite + Unpin + Send + Sync + 'static,
{
    pub fn new(reader: R, writer: W, request: &Request<RequestBody>) -> Self {
        Self::with_capacity(reader, writer, request, DEFAULT_READ_CAPACITY)
    }

    /// `request` is only inspected for its method, which decides whether the response carries a payload.
    pub fn with_capacity(reader: R, writer: W, request: &Request<RequestBody>, read_capacity: usize) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, ResponseDecoder::new(request.method().clone()), read_capacity),
            framed_write: FramedWrite::new(writer, RequestEncoder::new()),
        }
    }

    /// Sends `request` and waits for the response head.
    ///
    /// The returned response body owns the connection and reads the payload lazily.
    pub async fn send(mut self, request: Request<RequestBody>) -> Result<Response<ResponseBody>, HttpError> {
        self.send_request(request).await?;

        let (header, payload_size) = match self.framed_read.next().await {
            Some(Ok(Message::Header(head))) => head,
            Some(Ok(Message::Payload(_))) => {
                return Err(ParseError::invalid_body("received payload before response head").into());
            }
            Some(Err(e)) => return Err(e.into()),
            None => return Err(ParseError::invalid_header("connection closed before response head").into()),
        };

        debug!(status = %header.status(), ?payload_size, "received response head");

        let body = if payload_size.is_empty() {
            ResponseBody::empty()
        } else {
            ResponseBody::stream(PayloadBody::new(self.framed_read, self.framed_write, payload_size))
        };

        Ok(header.body(body))
    }

    async fn send_request(&mut self, request: Request<RequestBody>) -> Result<(), HttpError> {
        let (parts, mut body) = request.into_parts();
        let payload_size = PayloadSize::from_size_hint(&body.size_hint());
        trace!(method = %parts.method, uri = %parts.uri, ?payload_size, "sending request head");

        let head = Message::<_, Bytes>::Header((RequestHead::from_parts(parts, ()), payload_size));
        if payload_size.is_empty() {
            self.framed_write.send(head).await?;
            return Ok(());
        }
        self.framed_write.feed(head).await?;

        loop {
            match body.frame().await {
                Some(Ok(frame)) => {
                    // trailers are not sent
                    let Ok(bytes) = frame.into_data() else { continue };
                    self.framed_write.feed(Message::Payload(PayloadItem::Chunk(bytes))).await?;
                }
                Some(Err(e)) => return Err(SendError::invalid_body(format!("resolve request body error: {e}")).into()),
                None => {
                    self.framed_write.send(Message::Payload(PayloadItem::<Bytes>::Eof)).await?;
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn send_and_stream_response() {
        let (client, mut server) = tokio::io::duplex(1024);
        let (reader, writer) = tokio::io::split(client);

        let server_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 1024];
            let n = server.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            server.write_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nfoo\r\n3\r\nbar\r\n0\r\n\r\n").await.unwrap();
            request
        });

        let request = Request::post("http://localhost/echo").header("host", "localhost").body(RequestBody::from("ping")).unwrap();
        let connection = ClientConnection::new(reader, writer, &request);
        let response = connection.send(request).await.unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes, Bytes::from_static(b"foobar"));

        let request = server_task.await.unwrap();
        assert_eq!(request, "POST /echo HTTP/1.1\r\nhost: localhost\r\ncontent-length: 4\r\n\r\nping");
    }

    #[tokio::test]
    async fn closed_before_head() {
        let (client, mut server) = tokio::io::duplex(1024);
        let (reader, writer) = tokio::io::split(client);

        tokio::spawn(async move {
            let mut buf = vec![0u8; 1024];
            let _ = server.read(&mut buf).await.unwrap();
            drop(server);
        });

        let request = Request::get("http://localhost/").body(RequestBody::empty()).unwrap();
        let result = ClientConnection::new(reader, writer, &request).send(request).await;
        assert!(matches!(result, Err(HttpError::ResponseError { .. })));
    }
}
