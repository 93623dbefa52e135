use heroes_config::shared::{BatchConfig, PipelineConfig, RangeConfig, WindowConfig};
use heroes_ingest::destination::base::Destination;
use heroes_ingest::destination::memory::MemoryDestination;
use heroes_ingest::error::{ErrorKind, IngestResult};
use heroes_ingest::ingest_error;
use heroes_ingest::pipeline::Pipeline;
use heroes_ingest::source::memory::MemoryRecordSource;
use heroes_ingest::types::{HeroRecord, PersonId};
use heroes_telemetry::tracing::init_test_tracing;

fn pipeline_config(first: i32, last: i32, window: usize, batch: usize) -> PipelineConfig {
    PipelineConfig {
        range: RangeConfig { first, last },
        window: WindowConfig { max_size: window },
        batch: BatchConfig { max_size: batch },
    }
}

fn named_record(id: PersonId) -> HeroRecord {
    let mut record = HeroRecord::empty(id);
    record.name = Some(format!("Person {id}"));
    record
}

fn source_with_records(first: PersonId, last: PersonId) -> MemoryRecordSource {
    (first..=last).fold(MemoryRecordSource::new(), |source, id| {
        source.with_record(named_record(id))
    })
}

fn ids(records: &[HeroRecord]) -> Vec<PersonId> {
    records.iter().map(|record| record.id).collect()
}

/// Destination whose writes always fail, for error aggregation tests.
#[derive(Debug, Clone, Default)]
struct FailingDestination;

impl Destination for FailingDestination {
    fn name() -> &'static str {
        "failing"
    }

    async fn ensure_schema(&self) -> IngestResult<()> {
        Ok(())
    }

    async fn write_records(&self, _records: Vec<HeroRecord>) -> IngestResult<()> {
        Err(ingest_error!(
            ErrorKind::DestinationQueryFailed,
            "Scripted insert failure"
        ))
    }
}

#[tokio::test]
async fn persists_all_records_in_range_order() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let pipeline = Pipeline::new(
        pipeline_config(1, 5, 2, 5),
        source_with_records(1, 5),
        destination.clone(),
    );

    pipeline.run().await.unwrap();

    assert!(destination.schema_ensured().await);

    let batches = destination.batches().await;
    assert_eq!(batches.len(), 1);
    assert_eq!(ids(&batches[0]), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn not_found_identifiers_never_reach_the_destination() {
    init_test_tracing();

    // Person 3 has no remote representation; the remaining four fill one batch.
    let source = source_with_records(1, 5).with_not_found(3);
    let destination = MemoryDestination::new();
    let pipeline = Pipeline::new(pipeline_config(1, 5, 2, 4), source, destination.clone());

    pipeline.run().await.unwrap();

    assert_eq!(ids(&destination.records().await), vec![1, 2, 4, 5]);
}

#[tokio::test]
async fn partial_trailing_batch_is_never_persisted() {
    init_test_tracing();

    // 5 records with batch size 2: batches {1,2} and {3,4} commit, record 5 is dropped by
    // the rebatching stage.
    let destination = MemoryDestination::new();
    let pipeline = Pipeline::new(
        pipeline_config(1, 5, 2, 2),
        source_with_records(1, 5),
        destination.clone(),
    );

    pipeline.run().await.unwrap();

    let batches = destination.batches().await;
    assert_eq!(batches.len(), 2);

    let mut persisted = ids(&destination.records().await);
    persisted.sort_unstable();
    assert_eq!(persisted, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn transport_failure_aborts_the_run_after_the_previous_window() {
    init_test_tracing();

    // The failure on person 4 kills the whole {3,4} window; the batch formed from the
    // previous window may already be committed.
    let source = source_with_records(1, 5).with_transport_error(4);
    let destination = MemoryDestination::new();
    let pipeline = Pipeline::new(pipeline_config(1, 5, 2, 2), source, destination.clone());

    let error = pipeline.run().await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::SourceRequestFailed);

    let mut persisted = ids(&destination.records().await);
    persisted.sort_unstable();
    assert_eq!(persisted, vec![1, 2]);
}

#[tokio::test]
async fn duplicate_runs_produce_duplicate_rows() {
    init_test_tracing();

    let destination = MemoryDestination::new();

    for _ in 0..2 {
        let pipeline = Pipeline::new(
            pipeline_config(1, 2, 2, 2),
            source_with_records(1, 2),
            destination.clone(),
        );
        pipeline.run().await.unwrap();
    }

    // No dedup anywhere in the pipeline: the second run writes the same identifiers
    // again. Only a constraint in a real sink could reject them.
    let mut persisted = ids(&destination.records().await);
    persisted.sort_unstable();
    assert_eq!(persisted, vec![1, 1, 2, 2]);
}

#[tokio::test]
async fn every_identifier_yields_at_most_one_record_with_its_own_id() {
    init_test_tracing();

    let source = source_with_records(1, 10)
        .with_not_found(2)
        .with_not_found(7);
    let destination = MemoryDestination::new();
    let pipeline = Pipeline::new(pipeline_config(1, 10, 3, 1), source, destination.clone());

    pipeline.run().await.unwrap();

    let records = destination.records().await;
    for expected in [1, 3, 4, 5, 6, 8, 9, 10] {
        let matches: Vec<_> = records
            .iter()
            .filter(|record| record.id == expected)
            .collect();
        assert_eq!(matches.len(), 1, "identifier {expected}");
        assert_eq!(matches[0].name.as_deref(), Some(&*format!("Person {expected}")));
    }
    assert_eq!(records.len(), 8);
}

#[tokio::test]
async fn insert_failures_from_all_batches_are_aggregated() {
    init_test_tracing();

    let pipeline = Pipeline::new(
        pipeline_config(1, 4, 2, 2),
        source_with_records(1, 4),
        FailingDestination,
    );

    let error = pipeline.run().await.unwrap_err();

    // Both spawned insert tasks failed and both failures surface.
    assert_eq!(
        error.kinds(),
        vec![
            ErrorKind::DestinationQueryFailed,
            ErrorKind::DestinationQueryFailed
        ]
    );
}

#[tokio::test]
async fn invalid_configuration_fails_before_any_write() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let pipeline = Pipeline::new(
        pipeline_config(1, 5, 0, 2),
        source_with_records(1, 5),
        destination.clone(),
    );

    let error = pipeline.run().await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ConfigError);
    assert!(!destination.schema_ensured().await);
}
