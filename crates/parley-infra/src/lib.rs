//! Infrastructure layer for Parley.
//!
//! Contains the concrete pieces behind the traits defined in `parley-core`:
//! HTTP provider adapters, the static pricing table, SQLite storage for the
//! usage ledger and conversation log, and configuration loading.

pub mod config;
pub mod llm;
pub mod sqlite;
