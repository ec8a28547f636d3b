//! Provider abstractions for Parley.
//!
//! - `ProviderAdapter`: RPITIT trait for concrete backends
//! - `BoxProviderAdapter`: object-safe wrapper for dynamic dispatch
//! - `AdapterRegistry`: configured adapters and their dispatch limits
//! - `invoke`: one call, normalized into a `CallOutcome`

pub mod box_provider;
pub mod invoke;
pub mod provider;
pub mod registry;
pub mod token_estimate;

#[cfg(test)]
pub(crate) mod mock;

pub use box_provider::BoxProviderAdapter;
pub use invoke::invoke;
pub use provider::ProviderAdapter;
pub use registry::{AdapterRegistry, DispatchSettings, RegisteredAdapter};
