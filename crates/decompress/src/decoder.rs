//! Push based decoders for the supported content codings.
//!
//! Compressed bytes are written into a decoder and the plaintext it produced so far is
//! taken out of an in-memory [`Writer`], so decoding works chunk by chunk as the body is
//! read from the network.

use std::io::{self, Write};

use brotli::DecompressorWriter;
use bytes::{Bytes, BytesMut};
use flate2::write::{DeflateDecoder, MultiGzDecoder};

use crate::coding::ContentCoding;

/// Initial capacity of the plaintext buffer
const WRITER_CAPACITY: usize = 8 * 1024;

/// Internal buffer size of the brotli decompressor
const BROTLI_BUFFER_SIZE: usize = 4 * 1024;

/// A streaming decoder, one layer of a cascading body.
pub trait Decode {
    /// The coding name used in error messages.
    fn name(&self) -> &'static str;

    /// Feeds compressed `input` and returns the plaintext available so far.
    fn decode(&mut self, input: &[u8]) -> io::Result<Bytes>;

    /// Signals the end of the compressed stream and returns the remaining plaintext.
    ///
    /// Fails when the stream ended prematurely or its trailer does not check out.
    fn finish(self) -> io::Result<Bytes>
    where
        Self: Sized;

    /// Releases the decoder without finishing it.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Collects decoder output.
#[derive(Debug)]
pub struct Writer {
    buf: BytesMut,
}

impl Writer {
    fn new() -> Self {
        Self { buf: BytesMut::with_capacity(WRITER_CAPACITY) }
    }

    fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The decoders for the supported content codings.
pub enum Decoder {
    /// decodes every member of a multi-member gzip body
    Gzip(Box<MultiGzDecoder<Writer>>),
    Deflate(Box<DeflateDecoder<Writer>>),
    Br(Box<DecompressorWriter<Writer>>),
}

impl Decoder {
    pub fn new(coding: ContentCoding) -> Self {
        match coding {
            ContentCoding::Gzip => Self::Gzip(Box::new(MultiGzDecoder::new(Writer::new()))),
            ContentCoding::Deflate => Self::Deflate(Box::new(DeflateDecoder::new(Writer::new()))),
            ContentCoding::Br => Self::Br(Box::new(DecompressorWriter::new(Writer::new(), BROTLI_BUFFER_SIZE))),
        }
    }

    pub fn coding(&self) -> ContentCoding {
        match self {
            Decoder::Gzip(_) => ContentCoding::Gzip,
            Decoder::Deflate(_) => ContentCoding::Deflate,
            Decoder::Br(_) => ContentCoding::Br,
        }
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Decoder").field(&self.coding()).finish()
    }
}

impl Decode for Decoder {
    fn name(&self) -> &'static str {
        self.coding().name()
    }

    fn decode(&mut self, input: &[u8]) -> io::Result<Bytes> {
        // the decoders buffer output internally, flush pushes it into the writer
        match self {
            Self::Gzip(decoder) => {
                decoder.write_all(input)?;
                decoder.flush()?;
                Ok(decoder.get_mut().take())
            }
            Self::Deflate(decoder) => {
                decoder.write_all(input)?;
                decoder.flush()?;
                Ok(decoder.get_mut().take())
            }
            Self::Br(decoder) => {
                decoder.write_all(input)?;
                decoder.flush()?;
                Ok(decoder.get_mut().take())
            }
        }
    }

    fn finish(self) -> io::Result<Bytes> {
        match self {
            Self::Gzip(mut decoder) => {
                decoder.try_finish()?;
                Ok(decoder.get_mut().take())
            }
            Self::Deflate(mut decoder) => {
                decoder.try_finish()?;
                Ok(decoder.get_mut().take())
            }
            Self::Br(decoder) => match (*decoder).into_inner() {
                Ok(mut writer) => Ok(writer.take()),
                Err(_) => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "brotli stream ended prematurely")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{br, deflate, gzip};

    fn decode_in_chunks(coding: ContentCoding, compressed: &[u8], chunk_size: usize) -> io::Result<Vec<u8>> {
        let mut decoder = Decoder::new(coding);
        let mut plaintext = Vec::new();
        for chunk in compressed.chunks(chunk_size) {
            plaintext.extend_from_slice(&decoder.decode(chunk)?);
        }
        plaintext.extend_from_slice(&decoder.finish()?);
        Ok(plaintext)
    }

    #[test]
    fn decode_every_coding() {
        let data = b"foobarbaz".repeat(1000);

        for (coding, compressed) in
            [(ContentCoding::Gzip, gzip(&data)), (ContentCoding::Deflate, deflate(&data)), (ContentCoding::Br, br(&data))]
        {
            assert_eq!(decode_in_chunks(coding, &compressed, compressed.len()).unwrap(), data, "{coding}");
            assert_eq!(decode_in_chunks(coding, &compressed, 7).unwrap(), data, "{coding} in chunks");
        }
    }

    #[test]
    fn concatenated_gzip_members() {
        let mut compressed = gzip(b"foo");
        compressed.extend_from_slice(&gzip(b"bar"));

        assert_eq!(decode_in_chunks(ContentCoding::Gzip, &compressed, compressed.len()).unwrap(), b"foobar");
        assert_eq!(decode_in_chunks(ContentCoding::Gzip, &compressed, 5).unwrap(), b"foobar");
    }

    #[test]
    fn truncated_gzip_fails_to_finish() {
        let compressed = gzip(b"foobarbaz");
        let truncated = &compressed[..compressed.len() - 4];
        assert!(decode_in_chunks(ContentCoding::Gzip, truncated, 16).is_err());
    }

    #[test]
    fn truncated_brotli_fails_to_finish() {
        let compressed = br(&b"foobarbaz".repeat(100));
        let truncated = &compressed[..compressed.len() / 2];
        assert!(decode_in_chunks(ContentCoding::Br, truncated, 16).is_err());
    }

    #[test]
    fn corrupt_deflate() {
        let mut decoder = Decoder::new(ContentCoding::Deflate);
        assert!(decoder.decode(b"\xff\xff\xff\xff").is_err());
    }
}
