use std::future::Future;

use crate::error::IngestResult;
use crate::types::{HeroRecord, PersonId};

/// Trait for services that can resolve a person identifier into a record.
///
/// Implementations issue one lookup per identifier. `Ok(None)` means the remote side has
/// no usable record for the identifier and must be treated as "no record produced" by
/// callers, never as a failure. Errors are reserved for transport-level problems and abort
/// the fetch window that contains them.
///
/// A source is shared by reference across all concurrent fetches of a window; it is only
/// ever read, so implementations need no locking of their own.
pub trait RecordSource {
    /// Returns the name of the source, used in logs.
    fn name() -> &'static str;

    /// Fetches the record for `id`.
    fn fetch(
        &self,
        id: PersonId,
    ) -> impl Future<Output = IngestResult<Option<HeroRecord>>> + Send;
}
