//! The request-execution contract
//!
//! A [`Transport`] takes a request and returns the response for it. Implementations can
//! wrap other transports, which is how response post-processing (such as transparent
//! decompression) is layered over the network transport.
//!
//! [`DefaultTransport`] is the HTTP/1.1 implementation used when no other transport is
//! configured.

mod default_transport;

use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use http::{Request, Response};

use crate::protocol::body::{RequestBody, ResponseBody};

pub use default_transport::{DefaultTransport, DefaultTransportBuilder};

/// Executes a single HTTP request.
///
/// A returned response is owned by the caller, who is responsible for reading and
/// closing its body.
#[async_trait]
pub trait Transport: Send + Sync {
    type Error: Error + Send + Sync + 'static;

    async fn round_trip(&self, request: Request<RequestBody>) -> Result<Response<ResponseBody>, Self::Error>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    type Error = T::Error;

    async fn round_trip(&self, request: Request<RequestBody>) -> Result<Response<ResponseBody>, Self::Error> {
        (**self).round_trip(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    type Error = T::Error;

    async fn round_trip(&self, request: Request<RequestBody>) -> Result<Response<ResponseBody>, Self::Error> {
        (**self).round_trip(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    type Error = T::Error;

    async fn round_trip(&self, request: Request<RequestBody>) -> Result<Response<ResponseBody>, Self::Error> {
        (**self).round_trip(request).await
    }
}
