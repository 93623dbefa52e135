use std::future::Future;

use crate::error::IngestResult;
use crate::types::HeroRecord;

/// Trait for systems that can persist batches of fetched records.
///
/// One call to [`Destination::write_records`] is one unit of persistence: either the whole
/// batch becomes durable or none of it does. Batches are handed over in formation order
/// but may be persisted concurrently with each other and with ongoing production, so
/// implementations must not rely on cross-batch ordering.
pub trait Destination {
    /// Returns the name of the destination, used in logs.
    fn name() -> &'static str;

    /// Ensures the target schema exists.
    ///
    /// Called once at startup before any batch is written. Must be idempotent: running
    /// against a database that already has the schema is a no-op.
    fn ensure_schema(&self) -> impl Future<Output = IngestResult<()>> + Send;

    /// Persists one batch of records within a single transaction scoped to this call.
    ///
    /// No partial commit: a failure for any record fails the whole batch. Duplicate
    /// identifiers across separate runs are not detected here; only a constraint on the
    /// target table can reject them.
    fn write_records(
        &self,
        records: Vec<HeroRecord>,
    ) -> impl Future<Output = IngestResult<()>> + Send;
}
