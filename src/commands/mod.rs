//! Command Processing Module
//!
//! Receives decoded request frames from the connection layer, executes them
//! against the store, and produces the reply to send back.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │ RequestParser   │  (protocol module)
//! └────────┬────────┘
//!          │  Vec<Bytes>
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     Store       │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! `PING`, `SET`, `GET`, `DEL`, `EXPIRE`

pub mod handler;

// Re-export the main command handler
pub use handler::CommandHandler;
