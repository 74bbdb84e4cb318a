//! `Content-Encoding` parsing.
//!
//! The header lists the codings in the order they were applied, so decoding walks the
//! list from the right. [`EncodingChain::resolve`] turns the token list into that plan.

use std::fmt;

use http::HeaderMap;
use http::header::CONTENT_ENCODING;

/// A content coding this crate knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentCoding {
    /// gzip file format, RFC 1952
    Gzip,
    /// raw deflate stream, RFC 1951
    Deflate,
    /// brotli, RFC 7932
    Br,
}

impl ContentCoding {
    /// Looks up a coding by its token, ASCII case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match Token::parse(name) {
            Token::Decode(coding) => Some(coding),
            Token::Identity | Token::Unknown => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContentCoding::Gzip => "gzip",
            ContentCoding::Deflate => "deflate",
            ContentCoding::Br => "br",
        }
    }
}

impl fmt::Display for ContentCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a single `Content-Encoding` token asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Decode(ContentCoding),
    Identity,
    Unknown,
}

impl Token {
    fn parse(token: &str) -> Self {
        if token.is_empty() || token.eq_ignore_ascii_case("identity") {
            Token::Identity
        } else if token.eq_ignore_ascii_case("gzip") {
            Token::Decode(ContentCoding::Gzip)
        } else if token.eq_ignore_ascii_case("deflate") {
            Token::Decode(ContentCoding::Deflate)
        } else if token.eq_ignore_ascii_case("br") {
            Token::Decode(ContentCoding::Br)
        } else {
            Token::Unknown
        }
    }
}

/// The tokens of a `Content-Encoding` header in textual order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingChain {
    tokens: Vec<String>,
}

impl EncodingChain {
    /// Reads the `Content-Encoding` field of `headers`.
    ///
    /// Multiple field lines are joined in order, as one comma separated list. Returns
    /// `None` when the field is absent or every line is blank.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let mut joined = String::new();
        for value in headers.get_all(CONTENT_ENCODING) {
            let line = String::from_utf8_lossy(value.as_bytes());
            if line.trim_matches(is_ows).is_empty() {
                continue;
            }
            if !joined.is_empty() {
                joined.push_str(", ");
            }
            joined.push_str(&line);
        }

        if joined.is_empty() { None } else { Some(Self::parse(&joined)) }
    }

    /// Splits a header value on `,` and trims optional whitespace around each token.
    pub fn parse(value: &str) -> Self {
        let tokens = value.split(',').map(|token| token.trim_matches(is_ows).to_owned()).collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The codings to decode, in decode order (rightmost token first).
    ///
    /// `identity` and empty tokens are skipped, so an identity-only chain resolves to an
    /// empty plan. An unknown token fails the resolution and is returned as the error.
    pub fn resolve(&self) -> Result<Vec<ContentCoding>, &str> {
        let mut plan = Vec::with_capacity(self.tokens.len());
        for token in self.tokens.iter().rev() {
            match Token::parse(token) {
                Token::Decode(coding) => plan.push(coding),
                Token::Identity => {}
                Token::Unknown => return Err(token.as_str()),
            }
        }
        Ok(plan)
    }
}

/// optional whitespace, refer: <https://www.rfc-editor.org/rfc/rfc9110#section-5.6.3>
fn is_ows(c: char) -> bool {
    c == ' ' || c == '\t'
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    use ContentCoding::{Br, Deflate, Gzip};

    fn headers(values: &[&'static [u8]]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(CONTENT_ENCODING, HeaderValue::from_bytes(value).unwrap());
        }
        headers
    }

    #[test]
    fn absent_or_blank_header() {
        assert_eq!(EncodingChain::from_headers(&HeaderMap::new()), None);
        assert_eq!(EncodingChain::from_headers(&headers(&[b""])), None);
        assert_eq!(EncodingChain::from_headers(&headers(&[b"  "])), None);
    }

    #[test]
    fn tokens_keep_textual_order() {
        let chain = EncodingChain::parse(" gzip ,deflate,\tbr ");
        assert_eq!(chain.tokens(), ["gzip", "deflate", "br"]);
    }

    #[test]
    fn resolve_in_reverse_order() {
        let chain = EncodingChain::parse("gzip, deflate");
        assert_eq!(chain.resolve(), Ok(vec![Deflate, Gzip]));

        let chain = EncodingChain::parse("br, identity, gzip");
        assert_eq!(chain.resolve(), Ok(vec![Gzip, Br]));
    }

    #[test]
    fn identity_only_is_an_empty_plan() {
        assert_eq!(EncodingChain::parse("identity").resolve(), Ok(vec![]));
        assert_eq!(EncodingChain::parse("identity, ,IDENTITY").resolve(), Ok(vec![]));
    }

    #[test]
    fn tokens_are_case_insensitive() {
        assert_eq!(EncodingChain::parse("GZIP, Deflate, bR").resolve(), Ok(vec![Br, Deflate, Gzip]));
    }

    #[test]
    fn coding_from_name() {
        assert_eq!(ContentCoding::from_name("Deflate"), Some(Deflate));
        assert_eq!(ContentCoding::from_name(Br.name()), Some(Br));
        assert_eq!(ContentCoding::from_name("identity"), None);
        assert_eq!(ContentCoding::from_name("compress"), None);
    }

    #[test]
    fn unknown_token() {
        assert_eq!(EncodingChain::parse("unsupported, gzip").resolve(), Err("unsupported"));
        assert_eq!(EncodingChain::parse("gzip, x-gzip").resolve(), Err("x-gzip"));
    }

    #[test]
    fn multiple_header_lines_are_joined() {
        let chain = EncodingChain::from_headers(&headers(&[b"gzip", b"", b"br"])).unwrap();
        assert_eq!(chain.tokens(), ["gzip", "br"]);
        assert_eq!(chain.resolve(), Ok(vec![Br, Gzip]));
    }

    #[test]
    fn non_ascii_value_is_unknown() {
        let chain = EncodingChain::from_headers(&headers(&[b"gzip, \xa0br"])).unwrap();
        assert!(chain.resolve().is_err());
    }

    #[test]
    fn resolution_is_pure() {
        let chain = EncodingChain::parse("deflate, br, gzip");
        assert_eq!(chain.resolve(), chain.resolve());
        assert_eq!(EncodingChain::parse("deflate, br, gzip").resolve(), chain.resolve());
    }
}
