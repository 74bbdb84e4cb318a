//! Decoder for chunked response payloads, refer: <https://www.rfc-editor.org/rfc/rfc9112#section-7.1>
//!
//! The decoder works line by line: a size line (hex size plus optional extensions), the
//! chunk data followed by CRLF, and after the zero-sized last chunk an optional trailer
//! section terminated by an empty line. Trailer fields are discarded.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::protocol::{ParseError, PayloadItem};

/// Upper bound for a size line or a trailer line
const MAX_LINE_SIZE: usize = 4 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// expecting `size[;ext]\r\n`
    Size,
    /// reading chunk data, the remaining byte count
    Data(u64),
    /// expecting the CRLF closing a chunk
    DataEnd,
    /// reading trailer lines until an empty one
    Trailer,
    Done,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: State::Size }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                State::Size => {
                    let Some(line) = take_line(src)? else {
                        return Ok(None);
                    };
                    let size = parse_chunk_size(&line)?;
                    trace!(size, "read chunk size");
                    self.state = if size == 0 { State::Trailer } else { State::Data(size) };
                }

                State::Data(remaining) => {
                    if src.is_empty() {
                        return Ok(None);
                    }
                    let len = remaining.min(src.len() as u64);
                    let bytes = src.split_to(len as usize).freeze();

                    let remaining = remaining - len;
                    self.state = if remaining == 0 { State::DataEnd } else { State::Data(remaining) };
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }

                State::DataEnd => {
                    let line_end = match &src[..] {
                        [] | [b'\r'] => return Ok(None),
                        [b'\n', ..] => 1,
                        [b'\r', b'\n', ..] => 2,
                        _ => return Err(ParseError::invalid_body("missing CRLF after chunk data")),
                    };
                    src.advance(line_end);
                    self.state = State::Size;
                }

                State::Trailer => {
                    let Some(line) = take_line(src)? else {
                        return Ok(None);
                    };
                    if line.is_empty() {
                        trace!("finished reading chunked payload");
                        self.state = State::Done;
                    }
                }

                State::Done => return Ok(Some(PayloadItem::Eof)),
            }
        }
    }
}

/// Splits one line off `src`, without its line ending. A bare LF is accepted as terminator.
fn take_line(src: &mut BytesMut) -> Result<Option<BytesMut>, ParseError> {
    let Some(pos) = src.iter().position(|b| *b == b'\n') else {
        if src.len() > MAX_LINE_SIZE {
            return Err(ParseError::invalid_body("chunk line too long"));
        }
        return Ok(None);
    };

    let mut line = src.split_to(pos + 1);
    line.truncate(pos);
    if line.last() == Some(&b'\r') {
        line.truncate(pos - 1);
    }
    Ok(Some(line))
}

fn parse_chunk_size(line: &[u8]) -> Result<u64, ParseError> {
    let size_part = line.split(|b| *b == b';').next().unwrap_or_default().trim_ascii();
    if size_part.is_empty() {
        return Err(ParseError::invalid_body("empty chunk size"));
    }

    size_part.iter().try_fold(0u64, |size, b| {
        let digit = (*b as char).to_digit(16).ok_or_else(|| ParseError::invalid_body("invalid chunk size"))?;
        size.checked_mul(16)
            .and_then(|size| size.checked_add(u64::from(digit)))
            .ok_or_else(|| ParseError::invalid_body("chunk size overflow"))
    })
}
