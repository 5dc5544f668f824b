//! Reply Types for the Wire Protocol
//!
//! This module defines the reply shapes EmberKV sends back to clients.
//! The framing follows RESP (the Redis serialization protocol): every reply
//! starts with a one-byte type prefix and is terminated with CRLF.
//!
//! ## Reply Shapes
//!
//! - `+` Simple string: `+OK\r\n`
//! - `-` Error: `-ERR unknown command 'FOO'\r\n`
//! - `:` Integer: `:1\r\n`
//! - `$` Bulk string: `$5\r\nhello\r\n`
//! - `$-1` Null bulk string (missed lookup): `$-1\r\n`

use bytes::Bytes;

/// The CRLF terminator used by the wire protocol
pub const CRLF: &[u8] = b"\r\n";

/// Wire protocol type prefixes
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';
}

/// A reply to a client command.
///
/// Requests decode straight to argument vectors (see
/// [`crate::protocol::parser`]); this enum only models the outbound side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Non-binary-safe status string. Cannot contain CRLF.
    /// Format: `+<string>\r\n`
    Simple(String),

    /// Error condition reported to the client.
    /// Format: `-<error message>\r\n`
    Error(String),

    /// 64-bit signed integer.
    /// Format: `:<integer>\r\n`
    Int(i64),

    /// Binary-safe, length-prefixed string.
    /// Format: `$<length>\r\n<data>\r\n`
    Bulk(Bytes),

    /// "No value" — the null bulk string, `$-1\r\n`.
    Null,
}

impl Reply {
    /// Creates a simple string reply.
    pub fn simple(s: impl Into<String>) -> Self {
        Reply::Simple(s.into())
    }

    /// Creates an error reply.
    pub fn error(s: impl Into<String>) -> Self {
        Reply::Error(s.into())
    }

    /// Creates an integer reply.
    pub fn int(n: i64) -> Self {
        Reply::Int(n)
    }

    /// Creates a bulk string reply.
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Reply::Bulk(data.into())
    }

    /// The canonical success reply.
    pub fn ok() -> Self {
        Reply::Simple("OK".to_string())
    }

    /// The reply to PING.
    pub fn pong() -> Self {
        Reply::Simple("PONG".to_string())
    }

    /// Serializes the reply to its wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the reply into an existing buffer.
    ///
    /// More efficient than [`Reply::serialize`] when a buffer can be reused.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::Simple(s) => {
                buf.push(prefix::SIMPLE_STRING);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Error(s) => {
                buf.push(prefix::ERROR);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Int(n) => {
                buf.push(prefix::INTEGER);
                buf.extend_from_slice(n.to_string().as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Bulk(data) => {
                buf.push(prefix::BULK_STRING);
                buf.extend_from_slice(data.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                buf.extend_from_slice(data);
                buf.extend_from_slice(CRLF);
            }
            Reply::Null => {
                buf.push(prefix::BULK_STRING);
                buf.extend_from_slice(b"-1");
                buf.extend_from_slice(CRLF);
            }
        }
    }

    /// Returns true if this reply is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_serialize() {
        assert_eq!(Reply::simple("OK").serialize(), b"+OK\r\n");
    }

    #[test]
    fn test_error_serialize() {
        assert_eq!(
            Reply::error("ERR unknown command 'FOO'").serialize(),
            b"-ERR unknown command 'FOO'\r\n"
        );
    }

    #[test]
    fn test_int_serialize() {
        assert_eq!(Reply::int(1000).serialize(), b":1000\r\n");
        assert_eq!(Reply::int(-42).serialize(), b":-42\r\n");
    }

    #[test]
    fn test_bulk_serialize() {
        assert_eq!(
            Reply::bulk(Bytes::from("hello")).serialize(),
            b"$5\r\nhello\r\n"
        );
    }

    #[test]
    fn test_empty_bulk_serialize() {
        assert_eq!(Reply::bulk(Bytes::new()).serialize(), b"$0\r\n\r\n");
    }

    #[test]
    fn test_null_serialize() {
        assert_eq!(Reply::Null.serialize(), b"$-1\r\n");
    }

    #[test]
    fn test_binary_bulk_serialize() {
        let reply = Reply::bulk(Bytes::from(&b"hel\x00o"[..]));
        assert_eq!(reply.serialize(), b"$5\r\nhel\x00o\r\n");
    }

    #[test]
    fn test_ok_reply() {
        assert_eq!(Reply::ok().serialize(), b"+OK\r\n");
    }

    #[test]
    fn test_pong_reply() {
        assert_eq!(Reply::pong().serialize(), b"+PONG\r\n");
    }

    #[test]
    fn test_is_error() {
        assert!(Reply::error("ERR boom").is_error());
        assert!(!Reply::ok().is_error());
    }
}
