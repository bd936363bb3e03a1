//! A line-oriented shell: `|`-separated pipelines of external programs,
//! a trailing `&` to leave them running, an in-process `cd`, and shortcuts
//! recorded with `r` ... `s <name>` and replayed by typing the name.

pub mod builtin;
pub mod dispatch;
pub mod error;
pub mod eval;
pub mod global;
pub mod job;
pub mod parser;
pub mod record;
pub mod shell;
pub mod shortcut;
pub mod types;
