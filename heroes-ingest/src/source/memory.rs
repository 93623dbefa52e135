use std::collections::HashMap;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::{ErrorKind, IngestResult};
use crate::ingest_error;
use crate::source::base::RecordSource;
use crate::types::{HeroRecord, PersonId};

/// Scripted outcome for one identifier in a [`MemoryRecordSource`].
#[derive(Debug, Clone)]
enum ScriptedFetch {
    /// Resolve to a record, after an optional artificial delay.
    Record {
        record: HeroRecord,
        delay: Option<Duration>,
    },
    /// Resolve to "no record".
    NotFound,
    /// Fail with a transport-level error.
    TransportError,
}

/// In-memory record source for testing and development purposes.
///
/// Identifiers without a scripted outcome resolve to "not found". The source mirrors the
/// observable behavior of the HTTP source without touching the network, which makes
/// pipeline behavior fully deterministic in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    outcomes: HashMap<PersonId, ScriptedFetch>,
}

impl MemoryRecordSource {
    /// Creates a source with no scripted outcomes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the record's identifier to resolve to `record`.
    pub fn with_record(mut self, record: HeroRecord) -> Self {
        self.outcomes.insert(
            record.id,
            ScriptedFetch::Record {
                record,
                delay: None,
            },
        );
        self
    }

    /// Scripts the record's identifier to resolve to `record` after `delay` has elapsed.
    pub fn with_delayed_record(mut self, record: HeroRecord, delay: Duration) -> Self {
        self.outcomes.insert(
            record.id,
            ScriptedFetch::Record {
                record,
                delay: Some(delay),
            },
        );
        self
    }

    /// Scripts `id` to resolve to "no record".
    pub fn with_not_found(mut self, id: PersonId) -> Self {
        self.outcomes.insert(id, ScriptedFetch::NotFound);
        self
    }

    /// Scripts `id` to fail with a transport-level error.
    pub fn with_transport_error(mut self, id: PersonId) -> Self {
        self.outcomes.insert(id, ScriptedFetch::TransportError);
        self
    }
}

impl RecordSource for MemoryRecordSource {
    fn name() -> &'static str {
        "memory"
    }

    async fn fetch(&self, id: PersonId) -> IngestResult<Option<HeroRecord>> {
        match self.outcomes.get(&id) {
            Some(ScriptedFetch::Record { record, delay }) => {
                if let Some(delay) = delay {
                    sleep(*delay).await;
                }

                Ok(Some(record.clone()))
            }
            Some(ScriptedFetch::NotFound) | None => Ok(None),
            Some(ScriptedFetch::TransportError) => Err(ingest_error!(
                ErrorKind::SourceRequestFailed,
                "Scripted transport failure",
                format!("fetch for person {id} was scripted to fail")
            )),
        }
    }
}
