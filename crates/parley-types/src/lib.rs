//! Shared domain types for Parley.
//!
//! This crate contains the types passed between the dispatch core, the
//! provider adapters and the persistence layer: provider identifiers and
//! configuration, request descriptors, call outcomes, usage records, chat
//! modes and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod mode;
pub mod outcome;
pub mod request;
pub mod usage;
