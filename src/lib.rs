//! Purpose: Typed JSON convenience facade over serde_json, the file system, and HTTP.
//! Exports: `parse`, `parse_or_default`, `stringify`, file read/write helpers, `fetch_from_url`.
//! Role: Library crate root; stateless free functions plus one shared HTTP agent.
//! Invariants: Literal JSON `null` and a missing file are the only swallowed conditions.
//! Invariants: All other failures propagate as `Error` with a stable `ErrorKind`.

pub mod codec;
pub mod datetime;
pub mod error;
pub mod file;
pub mod net;

pub use codec::{parse, parse_or_default, stringify};
pub use error::{Error, ErrorKind, Result};
pub use file::{
    ReadOutcome, read_from_file, read_from_file_or_default, read_from_reader, write_to_file,
};
pub use net::{USER_AGENT, fetch_from_url};
