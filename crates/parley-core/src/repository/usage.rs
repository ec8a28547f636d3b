//! Usage record repository trait definition.

use parley_types::error::RepositoryError;
use parley_types::usage::UsageRecord;

/// Append-only store for usage records.
///
/// Implementations must be idempotent on `outcome_id`: appending the same
/// record twice leaves exactly one entry. Records are never updated or
/// deleted through this trait.
pub trait UsageRepository: Send + Sync {
    /// Append a record. A record whose `outcome_id` already exists is a no-op.
    fn append(
        &self,
        record: &UsageRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
