//! Append-Only Log Module
//!
//! Durability for EmberKV comes from a single append-only file of mutation
//! records, replayed on startup to rebuild the in-memory maps.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌──────────────┐   append (fsync)   ┌──────────────┐
//!            │    Store     │ ─────────────────> │   AofLog     │
//!            │  (mutation)  │                    │  (one file)  │
//!            └──────────────┘                    └──────┬───────┘
//!                    ▲                                  │
//!                    │          replay at startup       │
//!                    └──────────────────────────────────┘
//! ```
//!
//! Every accepted mutation (`SET`, `DEL`, `EXPIRE`) is appended as one text
//! line and fsynced before the store operation returns. On startup the log
//! is replayed in order, with the store's replay flag suppressing re-appends
//! so the rebuild is idempotent.

pub mod log;

// Re-export commonly used types
pub use log::AofLog;
