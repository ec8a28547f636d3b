//! Anthropic Messages API adapter.
//!
//! This module provides the [`AnthropicAdapter`] which implements the
//! [`ProviderAdapter`](parley_core::llm::provider::ProviderAdapter) trait
//! for `POST /v1/messages`.

pub mod client;
pub mod types;

pub use client::AnthropicAdapter;
