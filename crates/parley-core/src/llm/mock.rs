//! Scriptable adapter for tests.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parley_types::llm::{
    Payload, ProviderCapabilities, ProviderError, ProviderId, ProviderRequest, ProviderResponse,
    ReportedUsage,
};

use super::provider::ProviderAdapter;

#[derive(Clone)]
enum MockResult {
    Success(Payload),
    Error(MockError),
}

#[derive(Clone)]
enum MockError {
    Timeout,
    RateLimited(Option<u64>),
    Transport(String),
    Backend(String),
    Auth,
}

impl From<ProviderError> for MockError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Timeout => MockError::Timeout,
            ProviderError::RateLimited { retry_after_secs } => MockError::RateLimited(retry_after_secs),
            ProviderError::Transport(msg) => MockError::Transport(msg),
            ProviderError::AuthenticationFailed => MockError::Auth,
            other => MockError::Backend(other.to_string()),
        }
    }
}

pub(crate) struct MockAdapter {
    id: ProviderId,
    model: String,
    capabilities: ProviderCapabilities,
    result: MockResult,
    usage: Option<ReportedUsage>,
    delay: Option<Duration>,
    panic: bool,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<ProviderRequest>>>,
}

impl MockAdapter {
    fn new(id: ProviderId, result: MockResult, accepts_attachments: bool) -> Self {
        Self {
            id,
            model: format!("{id}-test-model"),
            capabilities: ProviderCapabilities {
                accepts_attachments,
                max_output_tokens: 300,
            },
            result,
            usage: None,
            delay: None,
            panic: false,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn text(id: ProviderId, text: &str) -> Self {
        Self::new(id, MockResult::Success(Payload::Text(text.to_string())), true)
    }

    pub(crate) fn image(id: ProviderId, url: &str) -> Self {
        Self::new(id, MockResult::Success(Payload::ImageRef(url.to_string())), false)
    }

    pub(crate) fn failing(id: ProviderId, err: ProviderError) -> Self {
        Self::new(id, MockResult::Error(err.into()), true)
    }

    pub(crate) fn with_usage(mut self, usage: ReportedUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn panicking(mut self) -> Self {
        self.panic = true;
        self
    }

    pub(crate) fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// The most recent request this adapter received.
    pub(crate) fn last_request(&self) -> Arc<Mutex<Option<ProviderRequest>>> {
        Arc::clone(&self.last_request)
    }
}

impl ProviderAdapter for MockAdapter {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    fn complete(
        &self,
        request: &ProviderRequest,
    ) -> impl std::future::Future<Output = Result<ProviderResponse, ProviderError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        let result = self.result.clone();
        let model = self.model.clone();
        let usage = self.usage;
        let delay = self.delay;
        let panic = self.panic;
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if panic {
                panic!("mock adapter panicked");
            }
            match result {
                MockResult::Success(payload) => Ok(ProviderResponse {
                    payload,
                    model,
                    usage,
                }),
                MockResult::Error(err) => Err(match err {
                    MockError::Timeout => ProviderError::Timeout,
                    MockError::RateLimited(retry_after_secs) => {
                        ProviderError::RateLimited { retry_after_secs }
                    }
                    MockError::Transport(msg) => ProviderError::Transport(msg),
                    MockError::Backend(message) => ProviderError::Backend { message },
                    MockError::Auth => ProviderError::AuthenticationFailed,
                }),
            }
        }
    }
}
