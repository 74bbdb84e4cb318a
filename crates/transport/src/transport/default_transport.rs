use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::header::{CONNECTION, HOST};
use http::uri::Scheme;
use http::{HeaderValue, Request, Response};
use once_cell::sync::Lazy;
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::connection::ClientConnection;
use crate::protocol::HttpError;
use crate::protocol::body::{RequestBody, ResponseBody};
use crate::transport::Transport;

const DEFAULT_READ_BUFFER_CAPACITY: usize = 8 * 1024;

static SHARED: Lazy<Arc<DefaultTransport>> = Lazy::new(|| Arc::new(DefaultTransport::new()));

/// HTTP/1.1 transport over plain TCP.
///
/// Every request opens its own connection, which is closed once the response body is
/// finished or closed. Only `http://` URIs are supported.
#[derive(Debug, Clone)]
pub struct DefaultTransport {
    read_buffer_capacity: usize,
    connect_timeout: Option<Duration>,
}

impl DefaultTransport {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> DefaultTransportBuilder {
        DefaultTransportBuilder::new()
    }

    /// The process wide instance used when no transport is configured.
    pub fn shared() -> Arc<DefaultTransport> {
        Arc::clone(&SHARED)
    }

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, HttpError> {
        let connect = TcpStream::connect((host, port));
        let stream = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, connect)
                .await
                .map_err(|_| HttpError::connect(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")))?,
            None => connect.await,
        }
        .map_err(HttpError::connect)?;

        stream.set_nodelay(true).map_err(HttpError::connect)?;
        trace!(host, port, "connected");
        Ok(stream)
    }
}

impl Default for DefaultTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for DefaultTransport {
    type Error = HttpError;

    async fn round_trip(&self, mut request: Request<RequestBody>) -> Result<Response<ResponseBody>, Self::Error> {
        let uri = request.uri().clone();
        if uri.scheme() != Some(&Scheme::HTTP) {
            return Err(HttpError::invalid_uri(format!("unsupported scheme in `{uri}`, only http is supported")));
        }
        let authority = uri.authority().ok_or_else(|| HttpError::invalid_uri(format!("missing host in `{uri}`")))?;
        let port = authority.port_u16().unwrap_or(80);
        let host = authority.host().trim_start_matches('[').trim_end_matches(']');

        let headers = request.headers_mut();
        if !headers.contains_key(HOST) {
            let value = HeaderValue::from_str(authority.as_str()).map_err(HttpError::invalid_uri)?;
            headers.insert(HOST, value);
        }
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        debug!(method = %request.method(), %uri, "round trip");
        let stream = self.connect(host, port).await?;
        let (reader, writer) = stream.into_split();

        let connection = ClientConnection::with_capacity(reader, writer, &request, self.read_buffer_capacity);
        connection.send(request).await
    }
}

/// Builder for [`DefaultTransport`].
#[derive(Debug, Clone)]
pub struct DefaultTransportBuilder {
    read_buffer_capacity: usize,
    connect_timeout: Option<Duration>,
}

impl DefaultTransportBuilder {
    fn new() -> Self {
        Self { read_buffer_capacity: DEFAULT_READ_BUFFER_CAPACITY, connect_timeout: None }
    }

    /// Initial capacity of the buffer responses are read into, defaults to 8KiB.
    pub fn read_buffer_capacity(mut self, capacity: usize) -> Self {
        self.read_buffer_capacity = capacity;
        self
    }

    /// Upper bound for establishing a connection, unbounded by default.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> DefaultTransport {
        DefaultTransport { read_buffer_capacity: self.read_buffer_capacity, connect_timeout: self.connect_timeout }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::BodyExt;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn rejects_non_http_uri() {
        let transport = DefaultTransport::new();

        let request = Request::get("https://example.com/").body(RequestBody::empty()).unwrap();
        assert!(matches!(transport.round_trip(request).await, Err(HttpError::InvalidUri { .. })));

        let request = Request::get("/relative").body(RequestBody::empty()).unwrap();
        assert!(matches!(transport.round_trip(request).await, Err(HttpError::InvalidUri { .. })));
    }

    #[tokio::test]
    async fn round_trip_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = stream.read(&mut buf).await.unwrap();
            stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello").await.unwrap();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        let transport = DefaultTransport::builder().connect_timeout(Duration::from_secs(5)).build();
        let request = Request::get(format!("http://{addr}/greeting")).body(RequestBody::empty()).unwrap();
        let response = transport.round_trip(request).await.unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes, Bytes::from_static(b"hello"));

        let request_text = server.await.unwrap();
        assert!(request_text.starts_with("GET /greeting HTTP/1.1\r\n"));
        assert!(request_text.contains(&format!("host: {addr}\r\n")));
        assert!(request_text.contains("connection: close\r\n"));
    }

    #[test]
    fn shared_is_one_instance() {
        assert!(Arc::ptr_eq(&DefaultTransport::shared(), &DefaultTransport::shared()));
    }
}
