//! Usage ledger: turns call outcomes into immutable usage records.
//!
//! Only successful outcomes are metered; a failed call produces no record.
//! Cost is a best-effort estimate from a static [`RateTable`].

use std::sync::Arc;

use parley_types::error::RepositoryError;
use parley_types::llm::{Payload, ProviderId};
use parley_types::outcome::CallOutcome;
use parley_types::usage::UsageRecord;

use crate::repository::UsageRepository;

/// Per-model prices in USD.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rates {
    pub input_per_million: f64,
    pub output_per_million: f64,
    /// Flat price per generated image.
    pub per_image: f64,
}

impl Rates {
    /// Cost of a call with the given token counts and payload.
    pub fn cost(&self, input_tokens: u32, output_tokens: u32, payload: Option<&Payload>) -> f64 {
        let input = (input_tokens as f64 / 1_000_000.0) * self.input_per_million;
        let output = (output_tokens as f64 / 1_000_000.0) * self.output_per_million;
        let image = match payload {
            Some(Payload::ImageRef(_)) => self.per_image,
            _ => 0.0,
        };
        input + output + image
    }
}

/// Static price lookup. Never performs network calls.
pub trait RateTable: Send + Sync {
    fn rates(&self, provider: ProviderId, model: &str) -> Rates;
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to persist usage record: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Meters outcomes into an append-only [`UsageRepository`].
pub struct UsageLedger<R: UsageRepository> {
    repository: R,
    rates: Arc<dyn RateTable>,
}

impl<R: UsageRepository> UsageLedger<R> {
    pub fn new(repository: R, rates: Arc<dyn RateTable>) -> Self {
        Self { repository, rates }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Build the record for an outcome without persisting it.
    ///
    /// Returns `None` for failed outcomes. The result depends only on the
    /// outcome and the rate table: the timestamp is the call's start time.
    pub fn build_record(&self, outcome: &CallOutcome) -> Option<UsageRecord> {
        if !outcome.is_success() {
            return None;
        }
        let rates = self.rates.rates(outcome.provider, &outcome.model);
        let usage = outcome.usage;
        Some(UsageRecord {
            outcome_id: outcome.id,
            timestamp: outcome.started_at,
            provider: outcome.provider,
            model: outcome.model.clone(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            estimated: usage.is_estimate(),
            estimated_cost: rates.cost(
                usage.input_tokens,
                usage.output_tokens,
                outcome.payload.as_ref(),
            ),
        })
    }

    /// Meter an outcome. Returns the appended record, or `None` if the
    /// outcome was not billable.
    pub async fn record(&self, outcome: &CallOutcome) -> Result<Option<UsageRecord>, LedgerError> {
        let Some(record) = self.build_record(outcome) else {
            tracing::debug!(provider = %outcome.provider, "failed outcome not metered");
            return Ok(None);
        };
        self.repository.append(&record).await?;
        tracing::debug!(
            provider = %record.provider,
            model = %record.model,
            input_tokens = record.input_tokens,
            output_tokens = record.output_tokens,
            cost = record.estimated_cost,
            "usage recorded"
        );
        Ok(Some(record))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use parley_types::outcome::{CallStatus, FailureKind, TokenUsage, UsageSource};
    use uuid::Uuid;

    use super::*;
    use crate::repository::usage::memory::InMemoryUsageRepository;

    /// Flat test prices: $2/M input, $10/M output, $0.04 per image.
    pub(crate) struct FlatRates;

    impl RateTable for FlatRates {
        fn rates(&self, _provider: ProviderId, _model: &str) -> Rates {
            Rates {
                input_per_million: 2.0,
                output_per_million: 10.0,
                per_image: 0.04,
            }
        }
    }

    fn success(payload: Payload, input: u32, output: u32) -> CallOutcome {
        CallOutcome {
            id: Uuid::now_v7(),
            provider: ProviderId::OpenAi,
            model: "gpt-4o".to_string(),
            status: CallStatus::Success,
            payload: Some(payload),
            failure_detail: None,
            usage: TokenUsage {
                input_tokens: input,
                output_tokens: output,
                source: UsageSource::Reported,
            },
            latency: Duration::from_millis(800),
            started_at: Utc::now(),
        }
    }

    fn ledger(repo: InMemoryUsageRepository) -> UsageLedger<InMemoryUsageRepository> {
        UsageLedger::new(repo, Arc::new(FlatRates))
    }

    #[test]
    fn test_rates_cost() {
        let rates = FlatRates.rates(ProviderId::OpenAi, "gpt-4o");
        let cost = rates.cost(1_000_000, 100_000, None);
        assert!((cost - 3.0).abs() < 1e-9);

        let image = rates.cost(0, 0, Some(&Payload::ImageRef("u".into())));
        assert!((image - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_build_record_is_pure() {
        let ledger = ledger(InMemoryUsageRepository::default());
        let outcome = success(Payload::Text("hi".into()), 100, 50);

        let first = ledger.build_record(&outcome).unwrap();
        let second = ledger.build_record(&outcome).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.outcome_id, outcome.id);
        assert_eq!(first.timestamp, outcome.started_at);
        assert!(!first.estimated);
        assert!(first.estimated_cost > 0.0);
    }

    #[test]
    fn test_failed_outcome_not_metered() {
        let ledger = ledger(InMemoryUsageRepository::default());
        let outcome = CallOutcome::failed(
            ProviderId::Anthropic,
            "claude",
            FailureKind::Timeout,
            None,
            Duration::from_secs(10),
            Utc::now(),
        );
        assert!(ledger.build_record(&outcome).is_none());
    }

    #[test]
    fn test_estimated_usage_is_flagged() {
        let ledger = ledger(InMemoryUsageRepository::default());
        let mut outcome = success(Payload::Text("hi".into()), 10, 2);
        outcome.usage.source = UsageSource::Estimated;
        assert!(ledger.build_record(&outcome).unwrap().estimated);
    }

    #[tokio::test]
    async fn test_duplicate_record_does_not_double_cost() {
        let ledger = ledger(InMemoryUsageRepository::default());
        let outcome = success(Payload::Text("answer".into()), 1000, 500);

        ledger.record(&outcome).await.unwrap();
        ledger.record(&outcome).await.unwrap();

        let records = ledger.repository().records();
        assert_eq!(records.len(), 1);
        let total: f64 = records.iter().map(|r| r.estimated_cost).sum();
        assert!((total - ledger.build_record(&outcome).unwrap().estimated_cost).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_record_failure_skips_repository() {
        let ledger = ledger(InMemoryUsageRepository::failing());
        let outcome = CallOutcome::failed(
            ProviderId::OpenAi,
            "gpt-4o",
            FailureKind::BackendError,
            None,
            Duration::ZERO,
            Utc::now(),
        );
        // A failing store is never touched for unbilled outcomes.
        assert!(ledger.record(&outcome).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persistence_error_surfaces_as_ledger_error() {
        let ledger = ledger(InMemoryUsageRepository::failing());
        let outcome = success(Payload::Text("x".into()), 1, 1);
        let err = ledger.record(&outcome).await.unwrap_err();
        assert!(matches!(err, LedgerError::Persistence(_)));
    }
}
