use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::destination::base::Destination;
use crate::error::IngestResult;
use crate::types::HeroRecord;

#[derive(Debug, Default)]
struct Inner {
    batches: Vec<Vec<HeroRecord>>,
    schema_ensured: bool,
}

/// In-memory destination for testing and development purposes.
///
/// [`MemoryDestination`] keeps every persisted batch in memory in the order the writes
/// arrived, which makes it easy to assert batch boundaries and record contents in tests.
/// All data is lost when the process terminates.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryDestination {
    /// Creates a new empty memory destination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all persisted batches, in write order.
    pub async fn batches(&self) -> Vec<Vec<HeroRecord>> {
        let inner = self.inner.lock().await;
        inner.batches.clone()
    }

    /// Returns a copy of all persisted records, flattened across batches.
    pub async fn records(&self) -> Vec<HeroRecord> {
        let inner = self.inner.lock().await;
        inner.batches.iter().flatten().cloned().collect()
    }

    /// Returns whether [`Destination::ensure_schema`] has been called.
    pub async fn schema_ensured(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.schema_ensured
    }
}

impl Destination for MemoryDestination {
    fn name() -> &'static str {
        "memory"
    }

    async fn ensure_schema(&self) -> IngestResult<()> {
        let mut inner = self.inner.lock().await;
        inner.schema_ensured = true;

        Ok(())
    }

    async fn write_records(&self, records: Vec<HeroRecord>) -> IngestResult<()> {
        let mut inner = self.inner.lock().await;

        info!(rows = records.len(), "storing batch in memory");

        inner.batches.push(records);

        Ok(())
    }
}
