//! Request Frame Parser
//!
//! This module decodes one client request frame from a byte stream into an
//! ordered list of arguments. A request is always an array of bulk strings:
//!
//! ```text
//! *<N>\r\n
//! $<len>\r\n<len bytes>\r\n     (N times)
//! ```
//!
//! There is no inline-command fallback: a frame that does not start with the
//! array marker, or an element that does not start with the bulk-string
//! marker, is a protocol error.
//!
//! ## How the Parser Works
//!
//! The parser reads from a buffer and returns either:
//! - `Ok(Some((args, consumed)))` - a complete frame, `consumed` bytes used
//! - `Ok(None)` - the buffer holds only a partial frame, read more bytes
//! - `Err(ParseError)` - the stream is not valid protocol data
//!
//! The caller appends incoming network data to a buffer, calls `parse`, and
//! on success advances the buffer by `consumed` bytes. End-of-stream handling
//! (clean disconnect vs. truncated frame) lives in the connection layer,
//! which knows whether the buffer was empty when the peer went away.

use bytes::Bytes;
use thiserror::Error;

use crate::protocol::types::{prefix, CRLF};

/// Errors that can occur while decoding a request frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The frame does not start with the array marker `*`
    #[error("expected array marker '*', got {0:#04x}")]
    ExpectedArray(u8),

    /// An element does not start with the bulk-string marker `$`
    #[error("expected bulk string marker '$', got {0:#04x}")]
    ExpectedBulkString(u8),

    /// A count or length field is not a valid decimal integer
    #[error("invalid length field: {0:?}")]
    InvalidLength(String),

    /// A count or length field is negative
    #[error("negative length field: {0}")]
    NegativeLength(i64),

    /// The element count exceeds the allowed maximum
    #[error("too many arguments: {count} (max: {max})")]
    TooManyArgs { count: usize, max: usize },

    /// A bulk string payload exceeds the allowed maximum
    #[error("bulk string too large: {size} bytes (max: {max})")]
    BulkTooLarge { size: usize, max: usize },

    /// A bulk string payload is not followed by CRLF
    #[error("bulk string missing trailing CRLF")]
    MissingCrlf,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum number of elements in a request frame
pub const MAX_ARGS: usize = 1024;

/// Maximum size for a single bulk string payload (512 MB, same as Redis)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// An incremental request-frame parser.
///
/// # Example
///
/// ```
/// use emberkv::protocol::RequestParser;
///
/// let mut parser = RequestParser::new();
/// let buf = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
///
/// let (args, consumed) = parser.parse(buf).unwrap().unwrap();
/// assert_eq!(args.len(), 2);
/// assert_eq!(consumed, buf.len());
/// ```
#[derive(Debug, Default)]
pub struct RequestParser;

impl RequestParser {
    /// Creates a new parser instance.
    pub fn new() -> Self {
        Self
    }

    /// Attempts to decode one request frame from the buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((args, consumed)))` - a complete frame was decoded
    /// - `Ok(None)` - incomplete data, need more bytes
    /// - `Err(e)` - the stream is misaligned or malformed
    pub fn parse(&mut self, buf: &[u8]) -> ParseResult<Option<(Vec<Bytes>, usize)>> {
        if buf.is_empty() {
            return Ok(None);
        }

        if buf[0] != prefix::ARRAY {
            return Err(ParseError::ExpectedArray(buf[0]));
        }

        let count_end = match find_crlf(&buf[1..]) {
            Some(pos) => pos,
            None => return Ok(None),
        };
        let count = parse_decimal(&buf[1..1 + count_end])?;
        if count < 0 {
            return Err(ParseError::NegativeLength(count));
        }
        let count = count as usize;
        if count > MAX_ARGS {
            return Err(ParseError::TooManyArgs {
                count,
                max: MAX_ARGS,
            });
        }

        let mut consumed = 1 + count_end + 2;
        let mut args = Vec::with_capacity(count);

        for _ in 0..count {
            if consumed >= buf.len() {
                return Ok(None);
            }
            match self.parse_bulk(&buf[consumed..])? {
                Some((arg, used)) => {
                    args.push(arg);
                    consumed += used;
                }
                None => return Ok(None),
            }
        }

        Ok(Some((args, consumed)))
    }

    /// Decodes one bulk string element: `$<len>\r\n<data>\r\n`
    fn parse_bulk(&mut self, buf: &[u8]) -> ParseResult<Option<(Bytes, usize)>> {
        if buf[0] != prefix::BULK_STRING {
            return Err(ParseError::ExpectedBulkString(buf[0]));
        }

        let len_end = match find_crlf(&buf[1..]) {
            Some(pos) => pos,
            None => return Ok(None),
        };
        let len = parse_decimal(&buf[1..1 + len_end])?;
        // Null bulk strings have no place in a request frame
        if len < 0 {
            return Err(ParseError::NegativeLength(len));
        }
        let len = len as usize;
        if len > MAX_BULK_SIZE {
            return Err(ParseError::BulkTooLarge {
                size: len,
                max: MAX_BULK_SIZE,
            });
        }

        let data_start = 1 + len_end + 2;
        let total = data_start + len + 2;
        if buf.len() < total {
            return Ok(None);
        }

        if &buf[data_start + len..data_start + len + 2] != CRLF {
            return Err(ParseError::MissingCrlf);
        }

        let data = Bytes::copy_from_slice(&buf[data_start..data_start + len]);
        Ok(Some((data, total)))
    }
}

/// Parses a decimal count/length field.
fn parse_decimal(buf: &[u8]) -> ParseResult<i64> {
    let s = std::str::from_utf8(buf)
        .map_err(|_| ParseError::InvalidLength(String::from_utf8_lossy(buf).into_owned()))?;
    s.parse()
        .map_err(|_| ParseError::InvalidLength(s.to_string()))
}

/// Finds the position of CRLF in the buffer.
///
/// Returns the position of `\r`, or None if CRLF is not present.
#[inline]
fn find_crlf(buf: &[u8]) -> Option<usize> {
    for i in 0..buf.len().saturating_sub(1) {
        if buf[i] == b'\r' && buf[i + 1] == b'\n' {
            return Some(i);
        }
    }
    None
}

/// Decodes a single request frame from bytes.
///
/// Convenience wrapper for one-shot use.
pub fn parse_request(buf: &[u8]) -> ParseResult<Option<(Vec<Bytes>, usize)>> {
    RequestParser::new().parse(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_request() {
        let input = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
        let (args, consumed) = parse_request(input).unwrap().unwrap();
        assert_eq!(args, vec![Bytes::from("GET"), Bytes::from("name")]);
        assert_eq!(consumed, input.len());
    }

    #[test]
    fn test_parse_set_request() {
        let input = b"*3\r\n$3\r\nSET\r\n$8\r\nuser:101\r\n$4\r\nAriz\r\n";
        let (args, _) = parse_request(input).unwrap().unwrap();
        assert_eq!(
            args,
            vec![
                Bytes::from("SET"),
                Bytes::from("user:101"),
                Bytes::from("Ariz"),
            ]
        );
    }

    #[test]
    fn test_parse_empty_array() {
        let (args, consumed) = parse_request(b"*0\r\n").unwrap().unwrap();
        assert!(args.is_empty());
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_incomplete_count_line() {
        assert!(parse_request(b"*2").unwrap().is_none());
    }

    #[test]
    fn test_incomplete_element() {
        assert!(parse_request(b"*2\r\n$3\r\nGET\r\n").unwrap().is_none());
    }

    #[test]
    fn test_incomplete_bulk_payload() {
        assert!(parse_request(b"*1\r\n$5\r\nhel").unwrap().is_none());
    }

    #[test]
    fn test_wrong_frame_marker() {
        let result = parse_request(b"PING\r\n");
        assert_eq!(result, Err(ParseError::ExpectedArray(b'P')));
    }

    #[test]
    fn test_wrong_element_marker() {
        let result = parse_request(b"*1\r\n+OK\r\n");
        assert_eq!(result, Err(ParseError::ExpectedBulkString(b'+')));
    }

    #[test]
    fn test_non_numeric_count() {
        let result = parse_request(b"*abc\r\n");
        assert!(matches!(result, Err(ParseError::InvalidLength(_))));
    }

    #[test]
    fn test_negative_count() {
        let result = parse_request(b"*-1\r\n");
        assert_eq!(result, Err(ParseError::NegativeLength(-1)));
    }

    #[test]
    fn test_negative_bulk_length() {
        let result = parse_request(b"*1\r\n$-1\r\n");
        assert_eq!(result, Err(ParseError::NegativeLength(-1)));
    }

    #[test]
    fn test_missing_trailing_crlf() {
        let result = parse_request(b"*1\r\n$5\r\nhelloXX");
        assert_eq!(result, Err(ParseError::MissingCrlf));
    }

    #[test]
    fn test_too_many_args() {
        let input = format!("*{}\r\n", MAX_ARGS + 1);
        let result = parse_request(input.as_bytes());
        assert!(matches!(result, Err(ParseError::TooManyArgs { .. })));
    }

    #[test]
    fn test_binary_safe_argument() {
        let input = b"*1\r\n$5\r\nhel\x00o\r\n";
        let (args, _) = parse_request(input).unwrap().unwrap();
        assert_eq!(args, vec![Bytes::from(&b"hel\x00o"[..])]);
    }

    #[test]
    fn test_empty_bulk_argument() {
        let input = b"*1\r\n$0\r\n\r\n";
        let (args, consumed) = parse_request(input).unwrap().unwrap();
        assert_eq!(args, vec![Bytes::new()]);
        assert_eq!(consumed, input.len());
    }

    #[test]
    fn test_consumed_leaves_pipelined_frame() {
        let input = b"*1\r\n$4\r\nPING\r\n*2\r\n$3\r\nGET\r\n$1\r\nk\r\n";
        let (args, consumed) = parse_request(input).unwrap().unwrap();
        assert_eq!(args, vec![Bytes::from("PING")]);

        let (args, _) = parse_request(&input[consumed..]).unwrap().unwrap();
        assert_eq!(args, vec![Bytes::from("GET"), Bytes::from("k")]);
    }

    // Encoding a request with the codec's framing rules and decoding it
    // recovers the original argument list byte-for-byte.
    #[test]
    fn test_request_roundtrip() {
        let original = vec![
            Bytes::from("SET"),
            Bytes::from("key with bytes"),
            Bytes::from(&b"\x01\x02\x03"[..]),
        ];

        let mut encoded = Vec::new();
        encoded.extend_from_slice(format!("*{}\r\n", original.len()).as_bytes());
        for arg in &original {
            encoded.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
            encoded.extend_from_slice(arg);
            encoded.extend_from_slice(b"\r\n");
        }

        let (decoded, consumed) = parse_request(&encoded).unwrap().unwrap();
        assert_eq!(decoded, original);
        assert_eq!(consumed, encoded.len());
    }
}
