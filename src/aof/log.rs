//! Append-Only Log File
//!
//! One text line per accepted mutation, `COMMAND arg1 arg2 ...`, written in
//! the exact order operations were applied to the store. Each append is
//! fsynced before it returns, so an acknowledged record survives a crash.
//!
//! ## File Format
//!
//! ```text
//! SET name Ariz
//! EXPIRE name 1754901000
//! DEL name
//! ```
//!
//! `EXPIRE` records carry the ABSOLUTE unix-seconds deadline rather than the
//! relative seconds the client sent, so replay reconstructs the exact
//! deadline no matter when the process restarts.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::storage::Store;

/// The durability log: an append-only file of mutation records.
///
/// All appends are serialized by an internal mutex, distinct from the store
/// lock. The store performs appends while holding its own write lock, which
/// is what keeps log order equal to memory-mutation order.
#[derive(Debug)]
pub struct AofLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl AofLog {
    /// Opens (or creates) the log file for appending.
    ///
    /// A failure here is fatal at startup: the server must not accept
    /// mutations it cannot make durable.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!(path = %path.display(), "append-only log opened");
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Appends one record and forces it to stable storage before returning.
    ///
    /// The record is `command` followed by the space-joined arguments and a
    /// newline terminator.
    pub fn append(&self, command: &str, args: &[&[u8]]) -> io::Result<()> {
        let mut line = Vec::with_capacity(command.len() + 16);
        line.extend_from_slice(command.as_bytes());
        for arg in args {
            line.push(b' ');
            line.extend_from_slice(arg);
        }
        line.push(b'\n');

        let mut file = self.file.lock().unwrap();
        file.write_all(&line)?;
        file.sync_data()
    }

    /// Replays every record in the log, in order, against `store`.
    ///
    /// Recognized records are `SET key value`, `DEL key`, and
    /// `EXPIRE key deadline` (absolute unix seconds). Unrecognized commands
    /// and lines with too few tokens are skipped; a torn final line after a
    /// crash must never prevent recovery of everything before it.
    ///
    /// The caller is responsible for setting the store's replay flag so that
    /// the applied mutations do not append back into this log.
    pub fn replay(&self, store: &Store) -> io::Result<usize> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut applied = 0usize;

        for line in reader.lines() {
            let line = line?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }

            match tokens[0].to_ascii_uppercase().as_str() {
                "SET" if tokens.len() >= 3 => {
                    store.set(
                        Bytes::copy_from_slice(tokens[1].as_bytes()),
                        Bytes::copy_from_slice(tokens[2].as_bytes()),
                    );
                    applied += 1;
                }
                "DEL" if tokens.len() >= 2 => {
                    store.del(tokens[1].as_bytes());
                    applied += 1;
                }
                "EXPIRE" if tokens.len() >= 3 => match tokens[2].parse::<i64>() {
                    Ok(deadline) => {
                        store.expire_at(tokens[1].as_bytes(), deadline);
                        applied += 1;
                    }
                    Err(_) => warn!(record = %line, "skipping expire record with bad deadline"),
                },
                _ => warn!(record = %line, "skipping unrecognized log record"),
            }
        }

        Ok(applied)
    }

    /// Flushes buffered bytes and fsyncs the file.
    ///
    /// Called once during orderly shutdown, after the sweeper has been
    /// joined, so no mutation can race the final flush.
    pub fn close(&self) -> io::Result<()> {
        let mut file = self.file.lock().unwrap();
        file.flush()?;
        file.sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::unix_now;
    use tempfile::tempdir;

    fn read_log(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_append_writes_one_line_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.aof");

        let log = AofLog::open(&path).unwrap();
        log.append("SET", &[b"name", b"Ariz"]).unwrap();
        log.append("DEL", &[b"name"]).unwrap();

        assert_eq!(read_log(&path), "SET name Ariz\nDEL name\n");
    }

    #[test]
    fn test_replay_rebuilds_final_key_set() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.aof");

        {
            let log = AofLog::open(&path).unwrap();
            let store = Store::open(log).unwrap();
            store.set(Bytes::from("a"), Bytes::from("1"));
            store.set(Bytes::from("b"), Bytes::from("2"));
            store.del(b"a");
            store.close().unwrap();
        }

        let log = AofLog::open(&path).unwrap();
        let store = Store::open(log).unwrap();
        assert_eq!(store.get(b"a"), None);
        assert_eq!(store.get(b"b"), Some(Bytes::from("2")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_replay_is_idempotent_across_restarts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.aof");

        {
            let log = AofLog::open(&path).unwrap();
            let store = Store::open(log).unwrap();
            store.set(Bytes::from("k"), Bytes::from("v"));
            store.close().unwrap();
        }
        let len_after_first = std::fs::metadata(&path).unwrap().len();

        // Two more restart cycles: state identical, log does not grow
        for _ in 0..2 {
            let log = AofLog::open(&path).unwrap();
            let store = Store::open(log).unwrap();
            assert_eq!(store.get(b"k"), Some(Bytes::from("v")));
            store.close().unwrap();
        }
        assert_eq!(std::fs::metadata(&path).unwrap().len(), len_after_first);
    }

    #[test]
    fn test_replay_skips_malformed_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.aof");
        std::fs::write(
            &path,
            "SET a 1\nBOGUS x y\nDEL\nEXPIRE a notanumber\nSET b 2\nSET c\n",
        )
        .unwrap();

        let log = AofLog::open(&path).unwrap();
        let store = Store::open(log).unwrap();
        assert_eq!(store.get(b"a"), Some(Bytes::from("1")));
        assert_eq!(store.get(b"b"), Some(Bytes::from("2")));
        assert_eq!(store.get(b"c"), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replay_restores_live_deadline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.aof");

        {
            let log = AofLog::open(&path).unwrap();
            let store = Store::open(log).unwrap();
            store.set(Bytes::from("session"), Bytes::from("tok"));
            assert!(store.expire(b"session", 1000));
            store.close().unwrap();
        }

        let contents = read_log(&path);
        assert!(contents.contains("EXPIRE session"), "log: {contents}");

        let log = AofLog::open(&path).unwrap();
        let store = Store::open(log).unwrap();
        // Deadline is far in the future, the key is still alive
        assert_eq!(store.get(b"session"), Some(Bytes::from("tok")));
    }

    #[test]
    fn test_replay_applies_past_deadline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.aof");
        let past = unix_now() - 60;
        std::fs::write(&path, format!("SET x hello\nEXPIRE x {past}\n")).unwrap();

        let log = AofLog::open(&path).unwrap();
        let store = Store::open(log).unwrap();
        // The deadline was already gone at startup: the lazy path reaps it
        assert_eq!(store.get(b"x"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_replay_does_not_grow_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.aof");
        std::fs::write(&path, "SET a 1\nDEL a\nSET b 2\n").unwrap();
        let len_before = std::fs::metadata(&path).unwrap().len();

        let log = AofLog::open(&path).unwrap();
        let store = Store::open(log).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), len_before);
    }

    #[test]
    fn test_close_is_safe_after_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.aof");

        let log = AofLog::open(&path).unwrap();
        log.append("SET", &[b"k", b"v"]).unwrap();
        log.close().unwrap();
        assert_eq!(read_log(&path), "SET k v\n");
    }
}
