use std::error::Error;
use std::io;

use thiserror::Error;

use crate::protocol::ParseError;

pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("read payload error: {source}")]
    Payload {
        #[from]
        source: ParseError,
    },

    #[error("decompress {encoding} error: {source}")]
    Decompress { encoding: &'static str, source: io::Error },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("body has been closed")]
    Closed,

    /// Both the outer layer and the body beneath it failed to close.
    #[error("{outer}: {inner}")]
    Combined { outer: Box<BodyError>, inner: Box<BodyError> },
}

impl BodyError {
    pub fn decompress<E: Into<io::Error>>(encoding: &'static str, e: E) -> Self {
        Self::Decompress { encoding, source: e.into() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Merges the results of closing a layer and closing the body beneath it.
    pub fn combine(outer: Result<(), BodyError>, inner: Result<(), BodyError>) -> Result<(), BodyError> {
        match (outer, inner) {
            (Err(outer), Err(inner)) => Err(Self::Combined { outer: Box::new(outer), inner: Box::new(inner) }),
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    /// The individual failures, outermost first.
    pub fn causes(&self) -> Vec<&BodyError> {
        match self {
            Self::Combined { outer, inner } => {
                let mut causes = outer.causes();
                causes.extend(inner.causes());
                causes
            }
            e => vec![e],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn combine_keeps_both_causes() {
        let outer = Err(BodyError::decompress("gzip", io::Error::new(ErrorKind::InvalidData, "corrupt deflate stream")));
        let inner = Err(BodyError::io(io::Error::new(ErrorKind::BrokenPipe, "broken pipe")));

        let combined = BodyError::combine(outer, inner).unwrap_err();
        assert_eq!(combined.to_string(), "decompress gzip error: corrupt deflate stream: io error: broken pipe");

        let causes = combined.causes();
        assert_eq!(causes.len(), 2);
        assert!(matches!(causes[0], BodyError::Decompress { encoding: "gzip", .. }));
        assert!(matches!(causes[1], BodyError::Io { .. }));
    }

    #[test]
    fn combine_single_failure() {
        assert!(matches!(BodyError::combine(Err(BodyError::Closed), Ok(())), Err(BodyError::Closed)));
        assert!(matches!(BodyError::combine(Ok(()), Err(BodyError::Closed)), Err(BodyError::Closed)));
        assert!(BodyError::combine(Ok(()), Ok(())).is_ok());
    }
}
