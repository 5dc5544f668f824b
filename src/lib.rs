//! # EmberKV - An In-Memory Key-Value Store with Append-Only-Log Durability
//!
//! EmberKV is a single-process key-value server speaking a RESP-style wire
//! protocol, with crash recovery via an append-only command log and per-key
//! time-based expiration.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                           EmberKV                              │
//! │                                                                │
//! │  ┌────────────┐   ┌─────────────┐   ┌─────────────┐            │
//! │  │ TCP Server │──>│ Connection  │──>│  Command    │            │
//! │  │ (Listener) │   │  Handler    │   │  Handler    │            │
//! │  └────────────┘   └─────────────┘   └──────┬──────┘            │
//! │                                            │                   │
//! │  ┌────────────┐                            ▼                   │
//! │  │  Request   │                  ┌──────────────────┐          │
//! │  │  Parser    │                  │      Store       │          │
//! │  └────────────┘                  │  data + expires  │          │
//! │                                  │  (one RwLock)    │          │
//! │                                  └───┬──────────▲───┘          │
//! │                                      │ append   │ sweep        │
//! │                                      ▼          │              │
//! │                              ┌──────────┐  ┌─────────┐         │
//! │                              │  AofLog  │  │ Sweeper │         │
//! │                              │ (fsync)  │  └─────────┘         │
//! │                              └──────────┘                      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Durability Model
//!
//! Every accepted mutation is applied to the in-memory maps under the store's
//! write lock and appended to the log — fsynced — before the operation
//! returns. On startup the log is replayed to completion before the listener
//! binds, so clients only ever see fully recovered state. Replay never
//! re-appends (the store's replay flag suppresses logging), keeping the
//! rebuild idempotent across any number of restarts.
//!
//! ## Expiration
//!
//! Keys expire two ways: lazily, when a read observes a passed deadline and
//! removes the key as part of servicing the lookup, and actively, via a
//! background sweeper that scans the deadline map once per second. Both paths
//! remove under the same exclusive lock that performed the check, so a
//! deletion is never logged twice.
//!
//! ## Supported Commands
//!
//! - `PING`
//! - `SET key value`
//! - `GET key`
//! - `DEL key`
//! - `EXPIRE key seconds`
//!
//! ## Module Overview
//!
//! - [`protocol`]: request frame parser and reply types
//! - [`storage`]: the store and the background expiry sweeper
//! - [`aof`]: the append-only durability log
//! - [`commands`]: command dispatch
//! - [`connection`]: client connection management

pub mod aof;
pub mod commands;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use aof::AofLog;
pub use commands::CommandHandler;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{ParseError, Reply, RequestParser};
pub use storage::{start_sweeper, Store, Sweeper};

/// The default port EmberKV listens on
pub const DEFAULT_PORT: u16 = 6380;

/// The default host EmberKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The default append-only log path
pub const DEFAULT_AOF_PATH: &str = "emberkv.aof";

/// Version of EmberKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
