//! Command Handler
//!
//! Maps a decoded argument vector to a store operation and builds the reply.
//! The first argument selects the command, case-insensitively; everything
//! after it is positional.
//!
//! | Command      | Arity | Reply                                    |
//! |--------------|-------|------------------------------------------|
//! | `PING`       | —     | `+PONG`                                  |
//! | `SET k v`    | ≥ 3   | `+OK`                                    |
//! | `GET k`      | ≥ 2   | bulk string, or `$-1` if missing         |
//! | `DEL k`      | ≥ 2   | `:1`, even if the key was absent         |
//! | `EXPIRE k s` | ≥ 3   | `:1` if the deadline was set, `:0` if not|
//!
//! Command-level failures (wrong arity, unparsable seconds, unknown name)
//! produce an error reply and mutate nothing; the connection stays open.

use std::sync::Arc;

use bytes::Bytes;

use crate::protocol::Reply;
use crate::storage::Store;

/// Executes client commands against the store.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    store: Arc<Store>,
}

impl CommandHandler {
    /// Creates a handler over the shared store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Executes one decoded request and returns the reply.
    pub fn execute(&self, args: Vec<Bytes>) -> Reply {
        if args.is_empty() {
            return Reply::error("ERR empty command");
        }

        let name = match std::str::from_utf8(&args[0]) {
            Ok(s) => s.to_ascii_uppercase(),
            Err(_) => return Reply::error("ERR invalid command name"),
        };

        match name.as_str() {
            "PING" => Reply::pong(),
            "SET" => self.cmd_set(&args),
            "GET" => self.cmd_get(&args),
            "DEL" => self.cmd_del(&args),
            "EXPIRE" => self.cmd_expire(&args),
            _ => Reply::error(format!("ERR unknown command '{name}'")),
        }
    }

    /// SET key value
    fn cmd_set(&self, args: &[Bytes]) -> Reply {
        if args.len() < 3 {
            return wrong_arity();
        }
        self.store.set(args[1].clone(), args[2].clone());
        Reply::ok()
    }

    /// GET key
    fn cmd_get(&self, args: &[Bytes]) -> Reply {
        if args.len() < 2 {
            return wrong_arity();
        }
        match self.store.get(&args[1]) {
            Some(value) => Reply::bulk(value),
            None => Reply::Null,
        }
    }

    /// DEL key
    ///
    /// Removal is unconditional and so is the `:1` reply.
    fn cmd_del(&self, args: &[Bytes]) -> Reply {
        if args.len() < 2 {
            return wrong_arity();
        }
        self.store.del(&args[1]);
        Reply::int(1)
    }

    /// EXPIRE key seconds
    fn cmd_expire(&self, args: &[Bytes]) -> Reply {
        if args.len() < 3 {
            return wrong_arity();
        }
        let seconds: i64 = match std::str::from_utf8(&args[2])
            .ok()
            .and_then(|s| s.parse().ok())
        {
            Some(n) => n,
            None => return Reply::error("ERR invalid expire time"),
        };
        if self.store.expire(&args[1], seconds) {
            Reply::int(1)
        } else {
            Reply::int(0)
        }
    }
}

fn wrong_arity() -> Reply {
    Reply::error("ERR wrong number of arguments")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::unix_now;

    fn handler() -> (CommandHandler, Arc<Store>) {
        let store = Arc::new(Store::in_memory());
        (CommandHandler::new(Arc::clone(&store)), store)
    }

    fn args(parts: &[&[u8]]) -> Vec<Bytes> {
        parts.iter().map(|p| Bytes::copy_from_slice(p)).collect()
    }

    #[test]
    fn test_ping() {
        let (handler, _) = handler();
        assert_eq!(handler.execute(args(&[b"PING"])), Reply::pong());
    }

    #[test]
    fn test_command_names_are_case_insensitive() {
        let (handler, _) = handler();
        assert_eq!(handler.execute(args(&[b"ping"])), Reply::pong());
        assert_eq!(
            handler.execute(args(&[b"set", b"k", b"v"])),
            Reply::ok()
        );
    }

    #[test]
    fn test_set_then_get() {
        let (handler, _) = handler();
        assert_eq!(handler.execute(args(&[b"SET", b"name", b"Ariz"])), Reply::ok());
        assert_eq!(
            handler.execute(args(&[b"GET", b"name"])),
            Reply::bulk(Bytes::from("Ariz"))
        );
    }

    #[test]
    fn test_get_missing_is_null() {
        let (handler, _) = handler();
        assert_eq!(handler.execute(args(&[b"GET", b"nope"])), Reply::Null);
    }

    #[test]
    fn test_del_replies_one_even_when_absent() {
        let (handler, _) = handler();
        assert_eq!(handler.execute(args(&[b"DEL", b"ghost"])), Reply::int(1));

        handler.execute(args(&[b"SET", b"k", b"v"]));
        assert_eq!(handler.execute(args(&[b"DEL", b"k"])), Reply::int(1));
        assert_eq!(handler.execute(args(&[b"GET", b"k"])), Reply::Null);
    }

    #[test]
    fn test_expire_present_and_absent() {
        let (handler, _) = handler();
        handler.execute(args(&[b"SET", b"k", b"v"]));
        assert_eq!(handler.execute(args(&[b"EXPIRE", b"k", b"100"])), Reply::int(1));
        assert_eq!(
            handler.execute(args(&[b"EXPIRE", b"ghost", b"100"])),
            Reply::int(0)
        );
    }

    #[test]
    fn test_expire_rejects_bad_seconds() {
        let (handler, store) = handler();
        handler.execute(args(&[b"SET", b"k", b"v"]));
        assert_eq!(
            handler.execute(args(&[b"EXPIRE", b"k", b"soon"])),
            Reply::error("ERR invalid expire time")
        );
        // No deadline was set
        assert_eq!(store.get(b"k"), Some(Bytes::from("v")));
    }

    #[test]
    fn test_get_of_expired_key_is_null() {
        let (handler, store) = handler();
        handler.execute(args(&[b"SET", b"x", b"hello"]));
        store.expire_at(b"x", unix_now() - 5);

        assert_eq!(handler.execute(args(&[b"GET", b"x"])), Reply::Null);
        assert!(store.is_empty());
    }

    #[test]
    fn test_wrong_arity_leaves_store_unchanged() {
        let (handler, store) = handler();
        assert_eq!(handler.execute(args(&[b"GET"])), Reply::error("ERR wrong number of arguments"));
        assert_eq!(handler.execute(args(&[b"SET", b"k"])), Reply::error("ERR wrong number of arguments"));
        assert_eq!(handler.execute(args(&[b"DEL"])), Reply::error("ERR wrong number of arguments"));
        assert_eq!(handler.execute(args(&[b"EXPIRE", b"k"])), Reply::error("ERR wrong number of arguments"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_command_names_the_command() {
        let (handler, store) = handler();
        assert_eq!(
            handler.execute(args(&[b"FOO", b"bar"])),
            Reply::error("ERR unknown command 'FOO'")
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_argument_list() {
        let (handler, _) = handler();
        assert_eq!(handler.execute(vec![]), Reply::error("ERR empty command"));
    }
}
