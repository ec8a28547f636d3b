//! Core logic for Parley: provider abstraction, dispatch, metering and
//! response reconciliation.
//!
//! Storage and HTTP live in parley-infra; this crate only defines the
//! traits they implement.

pub mod dispatch;
pub mod ledger;
pub mod llm;
pub mod mode;
pub mod reconcile;
pub mod repository;
