//! SQLite usage ledger store.
//!
//! Append-only: rows are inserted with `INSERT OR IGNORE` keyed by
//! `outcome_id`, never updated or deleted.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use parley_core::repository::usage::UsageRepository;
use parley_types::error::RepositoryError;
use parley_types::llm::ProviderId;
use parley_types::usage::{UsageRecord, UsageSummary};

use super::pool::DatabasePool;

/// SQLite-backed implementation of [`UsageRepository`].
pub struct SqliteUsageRepository {
    pool: DatabasePool,
}

impl SqliteUsageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Fetch one record by the outcome it was derived from.
    pub async fn find(&self, outcome_id: &Uuid) -> Result<Option<UsageRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM usage_records WHERE outcome_id = ?")
            .bind(outcome_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let usage_row =
                    UsageSqlRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(usage_row.into_record()?))
            }
            None => Ok(None),
        }
    }

    /// Per-provider totals, ordered by provider name.
    pub async fn summary(&self) -> Result<Vec<UsageSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT provider,
                      COUNT(*) AS calls,
                      COALESCE(SUM(input_tokens), 0) AS input_tokens,
                      COALESCE(SUM(output_tokens), 0) AS output_tokens,
                      COALESCE(SUM(estimated_cost), 0.0) AS total_cost
               FROM usage_records
               GROUP BY provider
               ORDER BY provider"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let provider: String = row
                .try_get("provider")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let calls: i64 = row.try_get("calls").map_err(|e| RepositoryError::Query(e.to_string()))?;
            let input_tokens: i64 = row
                .try_get("input_tokens")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let output_tokens: i64 = row
                .try_get("output_tokens")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let total_cost: f64 = row
                .try_get("total_cost")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

            summaries.push(UsageSummary {
                provider: parse_provider(&provider)?,
                calls: calls as u64,
                input_tokens: input_tokens as u64,
                output_tokens: output_tokens as u64,
                total_cost,
            });
        }

        Ok(summaries)
    }
}

impl UsageRepository for SqliteUsageRepository {
    async fn append(&self, record: &UsageRecord) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"INSERT OR IGNORE INTO usage_records
               (outcome_id, timestamp, provider, model, input_tokens, output_tokens, estimated, estimated_cost)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.outcome_id.to_string())
        .bind(format_datetime(&record.timestamp))
        .bind(record.provider.as_str())
        .bind(&record.model)
        .bind(record.input_tokens as i64)
        .bind(record.output_tokens as i64)
        .bind(record.estimated)
        .bind(record.estimated_cost)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            tracing::debug!(outcome_id = %record.outcome_id, "usage record already present");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Private Row types
// ---------------------------------------------------------------------------

struct UsageSqlRow {
    outcome_id: String,
    timestamp: String,
    provider: String,
    model: String,
    input_tokens: i64,
    output_tokens: i64,
    estimated: bool,
    estimated_cost: f64,
}

impl UsageSqlRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            outcome_id: row.try_get("outcome_id")?,
            timestamp: row.try_get("timestamp")?,
            provider: row.try_get("provider")?,
            model: row.try_get("model")?,
            input_tokens: row.try_get("input_tokens")?,
            output_tokens: row.try_get("output_tokens")?,
            estimated: row.try_get("estimated")?,
            estimated_cost: row.try_get("estimated_cost")?,
        })
    }

    fn into_record(self) -> Result<UsageRecord, RepositoryError> {
        Ok(UsageRecord {
            outcome_id: Uuid::parse_str(&self.outcome_id)
                .map_err(|e| RepositoryError::Query(format!("invalid outcome id: {e}")))?,
            timestamp: parse_datetime(&self.timestamp)?,
            provider: parse_provider(&self.provider)?,
            model: self.model,
            input_tokens: self.input_tokens as u32,
            output_tokens: self.output_tokens as u32,
            estimated: self.estimated,
            estimated_cost: self.estimated_cost,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_provider(s: &str) -> Result<ProviderId, RepositoryError> {
    s.parse().map_err(RepositoryError::Query)
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let url = super::super::pool::database_url(dir.path());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_record(provider: ProviderId, input: u32, output: u32, cost: f64) -> UsageRecord {
        UsageRecord {
            outcome_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            provider,
            model: "test-model".to_string(),
            input_tokens: input,
            output_tokens: output,
            estimated: false,
            estimated_cost: cost,
        }
    }

    #[tokio::test]
    async fn test_append_and_find() {
        let repo = SqliteUsageRepository::new(test_pool().await);
        let mut record = make_record(ProviderId::Anthropic, 120, 80, 0.0016);
        record.estimated = true;

        repo.append(&record).await.unwrap();

        let loaded = repo.find(&record.outcome_id).await.unwrap().unwrap();
        assert_eq!(loaded.provider, ProviderId::Anthropic);
        assert_eq!(loaded.input_tokens, 120);
        assert!(loaded.estimated);
        assert_eq!(loaded.timestamp.timestamp_millis(), record.timestamp.timestamp_millis());
    }

    #[tokio::test]
    async fn test_duplicate_append_is_ignored() {
        let repo = SqliteUsageRepository::new(test_pool().await);
        let record = make_record(ProviderId::OpenAi, 1000, 500, 0.0075);

        repo.append(&record).await.unwrap();
        repo.append(&record).await.unwrap();

        let summary = repo.summary().await.unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].calls, 1);
        assert!((summary[0].total_cost - 0.0075).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_summary_groups_by_provider() {
        let repo = SqliteUsageRepository::new(test_pool().await);
        repo.append(&make_record(ProviderId::OpenAi, 10, 20, 0.01)).await.unwrap();
        repo.append(&make_record(ProviderId::OpenAi, 30, 40, 0.02)).await.unwrap();
        repo.append(&make_record(ProviderId::ImageGen, 0, 0, 0.04)).await.unwrap();

        let summary = repo.summary().await.unwrap();
        assert_eq!(summary.len(), 2);

        let image = &summary[0];
        assert_eq!(image.provider, ProviderId::ImageGen);
        assert_eq!(image.calls, 1);

        let openai = &summary[1];
        assert_eq!(openai.provider, ProviderId::OpenAi);
        assert_eq!(openai.calls, 2);
        assert_eq!(openai.total_tokens(), 100);
        assert!((openai.total_cost - 0.03).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_summary_empty() {
        let repo = SqliteUsageRepository::new(test_pool().await);
        assert!(repo.summary().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_missing() {
        let repo = SqliteUsageRepository::new(test_pool().await);
        assert!(repo.find(&Uuid::now_v7()).await.unwrap().is_none());
    }
}
