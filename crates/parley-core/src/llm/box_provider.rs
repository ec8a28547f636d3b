//! BoxProviderAdapter -- object-safe dynamic dispatch wrapper for ProviderAdapter.
//!
//! 1. Define an object-safe `ProviderAdapterDyn` trait with boxed futures
//! 2. Blanket-impl `ProviderAdapterDyn` for all `T: ProviderAdapter`
//! 3. `BoxProviderAdapter` wraps `Box<dyn ProviderAdapterDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use parley_types::llm::{
    ProviderCapabilities, ProviderError, ProviderId, ProviderRequest, ProviderResponse,
};

use super::provider::ProviderAdapter;

/// Object-safe version of [`ProviderAdapter`] with boxed futures.
pub trait ProviderAdapterDyn: Send + Sync {
    fn id(&self) -> ProviderId;

    fn model(&self) -> &str;

    fn capabilities(&self) -> &ProviderCapabilities;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderResponse, ProviderError>> + Send + 'a>>;
}

impl<T: ProviderAdapter> ProviderAdapterDyn for T {
    fn id(&self) -> ProviderId {
        ProviderAdapter::id(self)
    }

    fn model(&self) -> &str {
        ProviderAdapter::model(self)
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        ProviderAdapter::capabilities(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ProviderResponse, ProviderError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased adapter so the registry can hold one of each backend.
///
/// Since `ProviderAdapter` uses RPITIT, it cannot be used as a trait object
/// directly; this wrapper provides equivalent methods over `ProviderAdapterDyn`.
pub struct BoxProviderAdapter {
    inner: Box<dyn ProviderAdapterDyn + Send + Sync>,
}

impl BoxProviderAdapter {
    /// Wrap a concrete `ProviderAdapter` in a type-erased box.
    pub fn new<T: ProviderAdapter + 'static>(adapter: T) -> Self {
        Self {
            inner: Box::new(adapter),
        }
    }

    pub fn id(&self) -> ProviderId {
        self.inner.id()
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }

    pub fn capabilities(&self) -> &ProviderCapabilities {
        self.inner.capabilities()
    }

    /// Send the request and wait for the whole response.
    pub async fn complete(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        self.inner.complete_boxed(request).await
    }
}

impl std::fmt::Debug for BoxProviderAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxProviderAdapter")
            .field("id", &self.id())
            .field("model", &self.model())
            .finish()
    }
}
