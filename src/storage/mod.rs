//! Storage Module
//!
//! The authoritative in-memory state for EmberKV and the background task
//! that keeps it from accumulating dead keys.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  Store                      │
//! │   one RwLock over:                          │
//! │     data:    key → value                    │
//! │     expires: key → unix-seconds deadline    │
//! │   every mutation appends to the AofLog      │
//! └─────────────────────────────────────────────┘
//!                      ▲
//!                      │ sweep_expired() every interval
//!        ┌─────────────┴─────────────┐
//!        │          Sweeper          │
//!        │  (background tokio task)  │
//!        └───────────────────────────┘
//! ```
//!
//! Expired keys are reaped two ways: lazily when a read observes a passed
//! deadline, and actively by the sweeper. Both converge to the same end
//! state and never double-log a deletion.
//!
//! ## Example
//!
//! ```
//! use emberkv::storage::Store;
//! use bytes::Bytes;
//!
//! let store = Store::in_memory();
//!
//! store.set(Bytes::from("name"), Bytes::from("Ariz"));
//! assert_eq!(store.get(b"name"), Some(Bytes::from("Ariz")));
//!
//! // Expiration never creates a key
//! assert!(!store.expire(b"missing", 60));
//! ```

pub mod store;
pub mod sweeper;

// Re-export commonly used types
pub use store::Store;
pub use sweeper::{start_sweeper, Sweeper, SWEEP_INTERVAL};
