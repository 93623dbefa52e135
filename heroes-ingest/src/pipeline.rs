use std::pin::pin;

use futures::StreamExt;
use heroes_config::shared::PipelineConfig;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bail;
use crate::concurrency::stream::FullBatchStream;
use crate::destination::base::Destination;
use crate::error::{ErrorKind, IngestError, IngestResult};
use crate::producer::stream_records;
use crate::source::base::RecordSource;

/// Drives the fetch, rebatch, and persist stages end to end.
///
/// Insert tasks are spawned as batches form and run concurrently with ongoing production.
/// [`Pipeline::run`] resolves only once every spawned task has completed and aggregates
/// all failures into one error. There is no retry at any stage: a transport failure ends
/// production, a failed batch stays failed, and batches committed before a failure remain
/// committed.
#[derive(Debug)]
pub struct Pipeline<S, D> {
    config: PipelineConfig,
    source: S,
    destination: D,
}

impl<S, D> Pipeline<S, D>
where
    S: RecordSource + Send + Sync + 'static,
    D: Destination + Clone + Send + Sync + 'static,
{
    /// Creates a pipeline over the given source and destination.
    pub fn new(config: PipelineConfig, source: S, destination: D) -> Self {
        Self {
            config,
            source,
            destination,
        }
    }

    /// Runs the pipeline to completion.
    ///
    /// Ensures the destination schema exists, then streams records through the rebatching
    /// stage, spawning one insert task per full batch. Resolves after the last insert task
    /// has finished, with an error aggregating every failure observed along the way.
    pub async fn run(self) -> IngestResult<()> {
        let Self {
            config,
            source,
            destination,
        } = self;

        if let Err(err) = config.validate() {
            bail!(
                ErrorKind::ConfigError,
                "Invalid pipeline configuration",
                err.to_string()
            );
        }

        info!(
            source = S::name(),
            destination = D::name(),
            first = config.range.first,
            last = config.range.last,
            window_size = config.window.max_size,
            batch_size = config.batch.max_size,
            "starting pipeline"
        );

        destination.ensure_schema().await?;

        let records = stream_records(
            source,
            config.range.first..=config.range.last,
            config.window.max_size,
        );
        let mut batches = pin!(FullBatchStream::wrap(records, config.batch.max_size));

        let mut insert_tasks: Vec<JoinHandle<IngestResult<()>>> = Vec::new();
        let mut errors: Vec<IngestError> = Vec::new();

        while let Some(batch) = batches.next().await {
            match batch {
                Ok(batch) => {
                    let destination = destination.clone();
                    insert_tasks.push(tokio::spawn(async move {
                        destination.write_records(batch).await
                    }));
                }
                Err(err) => {
                    warn!("production failed, waiting for in-flight inserts before exiting");
                    errors.push(err);
                    break;
                }
            }
        }

        // Every spawned insert task is awaited before the run resolves, so no batch is
        // abandoned by process exit and every failure surfaces.
        let spawned_inserts = insert_tasks.len();
        for task in insert_tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => errors.push(err),
                Err(err) => errors.push(err.into()),
            }
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }

        info!(batches = spawned_inserts, "pipeline completed");

        Ok(())
    }
}
