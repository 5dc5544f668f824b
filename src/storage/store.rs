//! Concurrent Key-Value Store with TTL Support
//!
//! This module implements the authoritative in-memory state for EmberKV:
//! a key→value map and a parallel key→deadline map, both guarded by a single
//! reader/writer lock, backed by the append-only log for durability.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                   Store                      │
//! │  ┌────────────────────────────────────────┐  │
//! │  │            RwLock<StoreInner>          │  │
//! │  │   data:    HashMap<Bytes, Bytes>       │  │
//! │  │   expires: HashMap<Bytes, i64>         │  │
//! │  └────────────────────────────────────────┘  │
//! │            AofLog (own mutex)                │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Reads that find no expiry concern run under the shared lock. A read that
//! observes a passed deadline upgrades: it drops the read lock, takes the
//! write lock, and RE-CHECKS the deadline before removing anything, so a
//! concurrent writer that refreshed the key in the window wins.
//!
//! Log appends happen while the write lock is held. That keeps the log's
//! record order identical to the order mutations hit memory, across every
//! connection task and the background sweeper.
//!
//! ## Lazy + Active Expiry
//!
//! Keys with a deadline are expired in two ways:
//! 1. **Lazy**: a read that finds a passed deadline removes the key
//! 2. **Active**: the background sweeper periodically scans the deadline map
//!
//! Both paths remove the key under the same exclusive lock that checked it,
//! so a deletion is never logged twice.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use tracing::{error, info};

use crate::aof::AofLog;

/// Current wall-clock time as unix seconds.
pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// The two maps behind the store lock.
///
/// Invariant: `expires` only holds keys present in `data`; any removal from
/// `data` removes the matching deadline in the same critical section.
#[derive(Debug, Default)]
struct StoreInner {
    data: HashMap<Bytes, Bytes>,
    expires: HashMap<Bytes, i64>,
}

/// The key-value store.
///
/// Designed to be wrapped in an `Arc` and shared across all connection tasks
/// and the background sweeper. All operations are thread-safe.
///
/// # Example
///
/// ```
/// use emberkv::storage::Store;
/// use bytes::Bytes;
///
/// let store = Store::in_memory();
///
/// store.set(Bytes::from("name"), Bytes::from("Ariz"));
/// assert_eq!(store.get(b"name"), Some(Bytes::from("Ariz")));
///
/// store.del(b"name");
/// assert_eq!(store.get(b"name"), None);
/// ```
#[derive(Debug)]
pub struct Store {
    inner: RwLock<StoreInner>,
    log: Option<AofLog>,
    replaying: AtomicBool,
}

impl Store {
    /// Opens a store backed by the given append-only log.
    ///
    /// The log is replayed to completion before this returns, so the store
    /// is fully recovered before any client-visible mutation can happen.
    pub fn open(log: AofLog) -> io::Result<Self> {
        let store = Self {
            inner: RwLock::new(StoreInner::default()),
            log: Some(log),
            replaying: AtomicBool::new(true),
        };

        let result = match &store.log {
            Some(log) => log.replay(&store),
            None => Ok(0),
        };
        store.replaying.store(false, Ordering::SeqCst);

        let applied = result?;
        info!(records = applied, keys = store.len(), "log replay complete");
        Ok(store)
    }

    /// Creates a store with no durability log (tests, benchmarks).
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            log: None,
            replaying: AtomicBool::new(false),
        }
    }

    /// Appends a mutation record unless the store is replaying.
    ///
    /// Called with the store write lock held, so record order matches the
    /// order mutations were applied to memory. An append failure leaves the
    /// in-memory mutation in place; the client still sees success and the
    /// failure is reported here.
    fn log_append(&self, command: &str, args: &[&[u8]]) {
        if self.replaying.load(Ordering::SeqCst) {
            return;
        }
        if let Some(log) = &self.log {
            if let Err(e) = log.append(command, args) {
                error!(command, error = %e, "log append failed; mutation is not durable");
            }
        }
    }

    /// Inserts or overwrites an entry.
    ///
    /// A fresh SET cancels any prior deadline for the key. Always succeeds.
    pub fn set(&self, key: Bytes, value: Bytes) {
        let mut inner = self.inner.write().unwrap();
        inner.expires.remove(&key[..]);
        inner.data.insert(key.clone(), value.clone());
        self.log_append("SET", &[key.as_ref(), value.as_ref()]);
    }

    /// Looks up a key, returning its value if present and not expired.
    ///
    /// A read that finds the key's deadline already passed treats it as a
    /// deletion: the key is removed from both maps and a `DEL` record is
    /// appended, as part of servicing this read (lazy expiration).
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        let now = unix_now();

        // Fast path: shared lock, no expiry concern
        {
            let inner = self.inner.read().unwrap();
            match inner.expires.get(key) {
                Some(&deadline) if now > deadline => {} // expired: fall through
                _ => return inner.data.get(key).cloned(),
            }
        }

        // The deadline has passed. Upgrade to the exclusive lock and
        // re-check: a writer may have refreshed the key in the window
        // between the two lock acquisitions, and the re-check honors it.
        let mut inner = self.inner.write().unwrap();
        match inner.expires.get(key) {
            Some(&deadline) if now > deadline => {
                inner.data.remove(key);
                inner.expires.remove(key);
                self.log_append("DEL", &[key]);
                None
            }
            _ => inner.data.get(key).cloned(),
        }
    }

    /// Removes a key and its deadline unconditionally.
    ///
    /// No error if the key is absent; the `DEL` record is appended either
    /// way, matching the unconditional semantics of the command.
    pub fn del(&self, key: &[u8]) {
        let mut inner = self.inner.write().unwrap();
        inner.data.remove(key);
        inner.expires.remove(key);
        self.log_append("DEL", &[key]);
    }

    /// Sets the key's deadline to `now + seconds`.
    ///
    /// Returns true if the key was present. An absent key is never mutated
    /// and never logged; expiration cannot implicitly create a key.
    pub fn expire(&self, key: &[u8], seconds: i64) -> bool {
        self.expire_at(key, unix_now() + seconds)
    }

    /// Sets an absolute unix-seconds deadline on a present key.
    ///
    /// This is also the replay path for `EXPIRE` records: the log stores
    /// absolute deadlines, so replay reconstructs them exactly regardless of
    /// when the process restarts.
    pub fn expire_at(&self, key: &[u8], deadline: i64) -> bool {
        let mut inner = self.inner.write().unwrap();
        let owned = match inner.data.get_key_value(key) {
            Some((k, _)) => k.clone(),
            None => return false,
        };
        inner.expires.insert(owned, deadline);
        let deadline_repr = deadline.to_string();
        self.log_append("EXPIRE", &[key, deadline_repr.as_bytes()]);
        true
    }

    /// Removes every key whose deadline has passed.
    ///
    /// One exclusive critical section covers the scan and the removals, so
    /// this can never double-log a deletion already taken by the lazy path.
    /// Returns the number of keys removed.
    pub fn sweep_expired(&self) -> usize {
        let now = unix_now();
        let mut inner = self.inner.write().unwrap();

        let expired: Vec<Bytes> = inner
            .expires
            .iter()
            .filter(|&(_, &deadline)| now > deadline)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.data.remove(key);
            inner.expires.remove(key);
            self.log_append("DEL", &[key.as_ref()]);
        }

        expired.len()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().data.len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flushes the durability log during orderly shutdown.
    pub fn close(&self) -> io::Result<()> {
        match &self.log {
            Some(log) => log.close(),
            None => Ok(()),
        }
    }
}
