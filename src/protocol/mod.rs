//! Wire Protocol Implementation
//!
//! This module implements EmberKV's RESP-style wire framing.
//!
//! ## Overview
//!
//! Requests arrive as arrays of bulk strings and decode to plain argument
//! vectors; replies are one of five shapes (simple string, error, integer,
//! bulk string, null bulk) sharing the same prefix-byte + CRLF framing.
//!
//! ## Modules
//!
//! - `types`: the [`Reply`] enum and its serialization
//! - `parser`: incremental decoder for incoming request frames
//!
//! ## Example
//!
//! ```
//! use emberkv::protocol::{parse_request, Reply};
//! use bytes::Bytes;
//!
//! // Decoding an incoming request
//! let data = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
//! let (args, consumed) = parse_request(data).unwrap().unwrap();
//! assert_eq!(args[0], Bytes::from("GET"));
//! assert_eq!(consumed, data.len());
//!
//! // Encoding a reply
//! let reply = Reply::bulk(Bytes::from("Ariz"));
//! assert_eq!(reply.serialize(), b"$4\r\nAriz\r\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_request, ParseError, ParseResult, RequestParser};
pub use types::Reply;
