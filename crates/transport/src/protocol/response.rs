use http::response::Parts;
use http::{HeaderMap, Method, Response, StatusCode, Version};

/// The head of a HTTP response read from the wire.
#[derive(Debug)]
pub struct ResponseHeader {
    inner: Response<()>,
}

impl AsRef<Response<()>> for ResponseHeader {
    fn as_ref(&self) -> &Response<()> {
        &self.inner
    }
}

impl AsMut<Response<()>> for ResponseHeader {
    fn as_mut(&mut self) -> &mut Response<()> {
        &mut self.inner
    }
}

impl ResponseHeader {
    pub fn into_inner(self) -> Response<()> {
        self.inner
    }

    pub fn body<T>(self, body: T) -> Response<T> {
        self.inner.map(|_| body)
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Interim responses (1xx) precede the final response of a request.
    pub fn is_informational(&self) -> bool {
        self.status().is_informational()
    }

    /// Whether a payload follows this head, refer: <https://www.rfc-editor.org/rfc/rfc9112#section-6.3>
    pub fn need_body(&self, request_method: &Method) -> bool {
        if request_method == Method::HEAD {
            return false;
        }

        let status = self.status();
        !(status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED)
    }
}

impl From<Parts> for ResponseHeader {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Response::from_parts(parts, ()) }
    }
}

impl From<Response<()>> for ResponseHeader {
    #[inline]
    fn from(inner: Response<()>) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(status: StatusCode) -> ResponseHeader {
        Response::builder().status(status).body(()).unwrap().into()
    }

    #[test]
    fn need_body() {
        assert!(header(StatusCode::OK).need_body(&Method::GET));
        assert!(header(StatusCode::NOT_FOUND).need_body(&Method::POST));

        assert!(!header(StatusCode::OK).need_body(&Method::HEAD));
        assert!(!header(StatusCode::NO_CONTENT).need_body(&Method::GET));
        assert!(!header(StatusCode::NOT_MODIFIED).need_body(&Method::GET));
        assert!(!header(StatusCode::CONTINUE).need_body(&Method::GET));
    }
}
