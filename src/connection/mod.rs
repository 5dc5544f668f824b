//! Connection Handling Module
//!
//! Each accepted client connection is serviced by its own async task,
//! allowing the server to handle many concurrent clients.
//!
//! ## Per-Connection State Machine
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                      (main.rs)                              │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │ accept() → spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │   AWAIT_FRAME ──> DECODE ──> DISPATCH ──> REPLY ──┐         │
//! │        ▲                                          │         │
//! │        └──────────────────────────────────────────┘         │
//! │                                                             │
//! │   exits on: clean disconnect / I/O error / framing error    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A connection carries no session state beyond its read buffer; commands
//! are independent and the store's lock is the only cross-connection
//! ordering authority.

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
