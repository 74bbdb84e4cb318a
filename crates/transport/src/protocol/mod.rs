//! Core HTTP client protocol abstractions.
//!
//! - **Message Handling** ([`Message`], [`PayloadItem`], [`PayloadSize`]): heads and payload
//!   chunks as they move through the codecs
//! - **Heads** ([`RequestHead`], [`ResponseHeader`]): the outgoing request head and the
//!   response head read from the wire
//! - **Bodies** ([`body`]): request bodies, closable response bodies and their errors
//! - **Errors** ([`HttpError`], [`ParseError`], [`SendError`])

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::RequestHead;

mod response;
pub use response::ResponseHeader;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

pub mod body;
