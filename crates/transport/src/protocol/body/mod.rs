//! HTTP body handling for the client.
//!
//! Request bodies are plain [`http_body::Body`] values handed to the transport. Response
//! bodies additionally carry an explicit close operation: a response body may be a chain of
//! layers (for example decompression layers) sitting on top of a live connection, and
//! closing the outermost layer has to release every layer beneath it exactly once.
//!
//! - [`RequestBody`]: the body of an outgoing request
//! - [`ResponseBody`]: the body handed to callers, empty, in memory, or a boxed [`CloseBody`]
//! - [`PayloadBody`]: the raw payload streaming from a connection
//! - [`CloseBody`]: the `{read, close}` capability every response body layer implements
//! - [`BodyError`]: errors raised while reading or closing a response body

mod error;
mod payload_body;
mod request_body;
mod response_body;

use std::pin::Pin;

use bytes::Bytes;
use http_body::Body;

pub use error::BodyError;
pub use error::BoxError;
pub use payload_body::PayloadBody;
pub use request_body::RequestBody;
pub use response_body::ResponseBody;

/// A response body that can be closed explicitly.
///
/// Closing releases the body and everything it reads from. Implementations must release
/// every underlying resource exactly once; closing an already closed body returns `Ok(())`.
/// Polling a closed body yields [`BodyError::Closed`].
pub trait CloseBody: Body<Data = Bytes, Error = BodyError> {
    fn close(self: Pin<&mut Self>) -> Result<(), BodyError>;
}
