//! SQLite storage layer.
//!
//! Usage ledger and conversation log backed by SQLite with WAL mode and
//! split read/write connection pools.

pub mod conversation;
pub mod pool;
pub mod usage;
