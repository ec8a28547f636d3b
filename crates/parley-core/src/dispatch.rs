//! Dispatch orchestrator for Parley.
//!
//! `DispatchOrchestrator` runs one logical request end to end: validate,
//! fan out to every requested provider concurrently, wait for all of them,
//! meter the outcomes, and reconcile them into a single reply. Each
//! provider call runs in its own tokio task under its own timeout; no call
//! is cancelled because a sibling finished first. Usage metering runs on a
//! detached task so a slow ledger store never delays the reply.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use parley_types::error::DispatchError;
use parley_types::llm::{ProviderId, ProviderRequest};
use parley_types::outcome::{CallOutcome, FailureKind, ResponseEnvelope};
use parley_types::request::RequestDescriptor;

use crate::ledger::UsageLedger;
use crate::llm::box_provider::BoxProviderAdapter;
use crate::llm::invoke::invoke;
use crate::llm::registry::{AdapterRegistry, DispatchSettings};
use crate::reconcile::ResponseReconciler;
use crate::repository::UsageRepository;

/// Fans requests out to providers and merges the results.
///
/// Holds only read-only state; one instance serves concurrent requests.
pub struct DispatchOrchestrator<R: UsageRepository> {
    registry: AdapterRegistry,
    ledger: Arc<UsageLedger<R>>,
    reconciler: ResponseReconciler,
    /// Ledger writes still in flight.
    pending_usage: Mutex<Vec<JoinHandle<()>>>,
}

impl<R: UsageRepository + 'static> DispatchOrchestrator<R> {
    pub fn new(registry: AdapterRegistry, ledger: UsageLedger<R>) -> Self {
        Self {
            registry,
            ledger: Arc::new(ledger),
            reconciler: ResponseReconciler::new(),
            pending_usage: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &UsageLedger<R> {
        &self.ledger
    }

    /// Run one request.
    ///
    /// Validation failures are returned before any provider is called.
    /// Provider failures never fail the request; they appear as `Failure`
    /// outcomes in the envelope, which always holds exactly one outcome per
    /// distinct requested provider, in request order.
    #[tracing::instrument(name = "dispatch", skip_all, fields(providers = request.requested_providers.len()))]
    pub async fn dispatch(
        &self,
        request: RequestDescriptor,
    ) -> Result<ResponseEnvelope, DispatchError> {
        let providers = self.validate(&request)?;
        let start = Instant::now();

        let handles = providers
            .iter()
            .map(|id| {
                let entry = self
                    .registry
                    .get(*id)
                    .ok_or(DispatchError::UnconfiguredProvider(*id))?;
                let adapter = Arc::clone(&entry.adapter);
                let settings = entry.settings;
                let provider_request = build_provider_request(&request, settings);
                Ok((*id, tokio::spawn(run_call(adapter, provider_request, settings))))
            })
            .collect::<Result<Vec<_>, DispatchError>>()?;

        let (ids, handles): (Vec<ProviderId>, Vec<_>) = handles.into_iter().unzip();
        let joined = join_all(handles).await;

        let outcomes: Vec<CallOutcome> = ids
            .into_iter()
            .zip(joined)
            .map(|(id, result)| match result {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    warn!(provider = %id, error = %join_err, "provider task aborted");
                    let model = self
                        .registry
                        .get(id)
                        .map(|e| e.adapter.model().to_string())
                        .unwrap_or_default();
                    CallOutcome::failed(
                        id,
                        model,
                        FailureKind::BackendError,
                        Some(format!("task failed: {join_err}")),
                        start.elapsed(),
                        Utc::now(),
                    )
                }
            })
            .collect();

        let display_text = self.reconciler.reconcile(&outcomes);
        self.record_usage(&outcomes);

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!(
            providers = outcomes.len(),
            succeeded,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "dispatch complete"
        );

        Ok(ResponseEnvelope {
            outcomes,
            display_text,
        })
    }

    /// Wait for every ledger write started so far.
    ///
    /// Hosts call this before shutting the runtime down; dropping the
    /// runtime would otherwise cancel writes that have not finished.
    pub async fn flush_usage(&self) {
        let handles = std::mem::take(&mut *self.lock_pending());
        for result in join_all(handles).await {
            if let Err(e) = result {
                warn!(error = %e, "usage write task aborted");
            }
        }
    }

    /// Meter successful outcomes on a detached task.
    fn record_usage(&self, outcomes: &[CallOutcome]) {
        let billable: Vec<CallOutcome> = outcomes.iter().filter(|o| o.is_success()).cloned().collect();
        if billable.is_empty() {
            return;
        }

        let ledger = Arc::clone(&self.ledger);
        let handle = tokio::spawn(async move {
            for outcome in &billable {
                if let Err(e) = ledger.record(outcome).await {
                    warn!(
                        provider = %outcome.provider,
                        outcome_id = %outcome.id,
                        error = %e,
                        "usage record not persisted"
                    );
                }
            }
        });

        let mut pending = self.lock_pending();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending_usage.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn validate(&self, request: &RequestDescriptor) -> Result<Vec<ProviderId>, DispatchError> {
        if request.prompt.trim().is_empty() {
            return Err(DispatchError::EmptyPrompt);
        }
        let providers = request.distinct_providers();
        if providers.is_empty() {
            return Err(DispatchError::NoProviders);
        }
        if let Some(missing) = providers.iter().find(|id| !self.registry.contains(**id)) {
            return Err(DispatchError::UnconfiguredProvider(*missing));
        }
        Ok(providers)
    }
}

/// One provider call under its own deadline.
async fn run_call(
    adapter: Arc<BoxProviderAdapter>,
    request: ProviderRequest,
    settings: DispatchSettings,
) -> CallOutcome {
    let started_at = Utc::now();
    let start = Instant::now();
    match tokio::time::timeout(settings.timeout, invoke(&adapter, &request)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(
                provider = %adapter.id(),
                timeout_secs = settings.timeout.as_secs(),
                "provider call timed out"
            );
            CallOutcome::failed(
                adapter.id(),
                adapter.model(),
                FailureKind::Timeout,
                Some(format!("no response within {}s", settings.timeout.as_secs())),
                start.elapsed(),
                started_at,
            )
        }
    }
}

fn build_provider_request(request: &RequestDescriptor, settings: DispatchSettings) -> ProviderRequest {
    ProviderRequest {
        prompt: request.prompt.clone(),
        attachment: request.attachment.clone(),
        system: request.mode_instruction.clone(),
        max_tokens: settings.token_ceiling,
    }
}
