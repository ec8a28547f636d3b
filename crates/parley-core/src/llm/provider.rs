//! ProviderAdapter trait definition.
//!
//! This is the core abstraction that every backend implements. Uses RPITIT
//! for `complete`, so concrete adapters can be plain `async fn`s.

use parley_types::llm::{
    ProviderCapabilities, ProviderError, ProviderId, ProviderRequest, ProviderResponse,
};

/// Trait for provider backends (OpenAI chat, Anthropic, image generation).
///
/// An adapter translates a generic [`ProviderRequest`] into one HTTP call
/// and translates the reply (or error) back. It performs no metering and
/// keeps no per-request state.
///
/// Implementations live in parley-infra (e.g., `AnthropicAdapter`).
pub trait ProviderAdapter: Send + Sync {
    /// Which backend this adapter talks to.
    fn id(&self) -> ProviderId;

    /// Configured model identifier.
    fn model(&self) -> &str;

    /// What this adapter can accept (attachments, output ceiling).
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send the request and wait for the whole response.
    fn complete(
        &self,
        request: &ProviderRequest,
    ) -> impl std::future::Future<Output = Result<ProviderResponse, ProviderError>> + Send;
}
