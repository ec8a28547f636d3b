//! Usage accounting types.
//!
//! A [`UsageRecord`] is an append-only accounting entry for one successful
//! provider call. Records are keyed by the outcome they were derived from so
//! that a retried append never produces a second entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::ProviderId;

/// One immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Id of the [`crate::outcome::CallOutcome`] this record meters.
    pub outcome_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub provider: ProviderId,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// True when the token counts are a text-length estimate.
    pub estimated: bool,
    /// Best-effort cost in USD from the static rate table.
    pub estimated_cost: f64,
}

/// Per-provider totals read back from the ledger store for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub provider: ProviderId,
    pub calls: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_cost: f64,
}

impl UsageSummary {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_record_serde_roundtrip() {
        let record = UsageRecord {
            outcome_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            provider: ProviderId::Anthropic,
            model: "claude-3-5-sonnet-latest".to_string(),
            input_tokens: 12,
            output_tokens: 40,
            estimated: false,
            estimated_cost: 0.000_636,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"provider\":\"anthropic\""));
        let parsed: UsageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_summary_total_tokens() {
        let summary = UsageSummary {
            provider: ProviderId::OpenAi,
            calls: 3,
            input_tokens: 100,
            output_tokens: 250,
            total_cost: 0.01,
        };
        assert_eq!(summary.total_tokens(), 350);
    }
}
