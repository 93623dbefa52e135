//! Windowed concurrent production of person records.

use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::vec;

use futures::future::try_join_all;
use futures::stream::{self, Stream};
use tracing::debug;

use crate::error::IngestResult;
use crate::source::base::RecordSource;
use crate::types::{HeroRecord, PersonId};

struct ProducerState<S> {
    source: S,
    windows: vec::IntoIter<Vec<PersonId>>,
    ready: VecDeque<HeroRecord>,
}

/// Streams records for every identifier in `range`, fetched in windows of at most
/// `window_size` concurrent requests.
///
/// Windows are processed strictly in range order and joined all-or-nothing: the stream
/// suspends until every fetch of the current window has completed, and the first
/// transport-level failure in a window ends the stream with that error. Within a window
/// the output preserves identifier order. Identifiers that resolve to no record are
/// dropped from the output.
pub fn stream_records<S>(
    source: S,
    range: RangeInclusive<PersonId>,
    window_size: usize,
) -> impl Stream<Item = IngestResult<HeroRecord>>
where
    S: RecordSource,
{
    let state = ProducerState {
        source,
        windows: partition_windows(range, window_size).into_iter(),
        ready: VecDeque::new(),
    };

    stream::try_unfold(state, |mut state| async move {
        loop {
            if let Some(record) = state.ready.pop_front() {
                return Ok(Some((record, state)));
            }

            let Some(window) = state.windows.next() else {
                return Ok(None);
            };

            debug!(window_len = window.len(), "fetching window");

            let results = try_join_all(window.iter().map(|id| state.source.fetch(*id))).await?;
            state.ready.extend(results.into_iter().flatten());
        }
    })
}

/// Partitions `range` into contiguous windows of at most `window_size` identifiers,
/// preserving range order.
fn partition_windows(range: RangeInclusive<PersonId>, window_size: usize) -> Vec<Vec<PersonId>> {
    assert!(window_size > 0, "window size must be greater than zero");

    range
        .collect::<Vec<_>>()
        .chunks(window_size)
        .map(|window| window.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::source::memory::MemoryRecordSource;
    use futures::StreamExt;
    use std::time::Duration;

    fn source_with_records(ids: RangeInclusive<PersonId>) -> MemoryRecordSource {
        ids.fold(MemoryRecordSource::new(), |source, id| {
            source.with_record(HeroRecord::empty(id))
        })
    }

    #[test]
    fn partitions_range_into_ordered_windows() {
        let windows = partition_windows(1..=5, 2);

        assert_eq!(windows, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn partitions_single_window_when_range_fits() {
        let windows = partition_windows(1..=3, 10);

        assert_eq!(windows, vec![vec![1, 2, 3]]);
    }

    #[tokio::test]
    async fn emits_all_records_in_range_order() {
        let source = source_with_records(1..=5);

        let records: Vec<_> = stream_records(source, 1..=5, 2).collect().await;
        let ids: Vec<_> = records
            .into_iter()
            .map(|record| record.unwrap().id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn window_order_is_preserved_when_the_first_fetch_is_slowest() {
        // Person 1 resolves long after persons 2 and 3, but the window join puts it first.
        let source = MemoryRecordSource::new()
            .with_delayed_record(HeroRecord::empty(1), Duration::from_secs(5))
            .with_record(HeroRecord::empty(2))
            .with_record(HeroRecord::empty(3));

        let records: Vec<_> = stream_records(source, 1..=3, 3).collect().await;
        let ids: Vec<_> = records
            .into_iter()
            .map(|record| record.unwrap().id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn not_found_identifiers_are_dropped() {
        let source = source_with_records(1..=5).with_not_found(3);

        let records: Vec<_> = stream_records(source, 1..=5, 2).collect().await;
        let ids: Vec<_> = records
            .into_iter()
            .map(|record| record.unwrap().id)
            .collect();

        assert_eq!(ids, vec![1, 2, 4, 5]);
    }

    #[tokio::test]
    async fn transport_failure_ends_the_stream_with_an_error() {
        let source = source_with_records(1..=5).with_transport_error(4);

        let mut results: Vec<_> = stream_records(source, 1..=5, 2).collect().await;

        // Window {1,2} completes, window {3,4} fails as a whole, window {5} never runs.
        let failure = results.pop().unwrap();
        assert_eq!(
            failure.unwrap_err().kind(),
            ErrorKind::SourceRequestFailed
        );

        let ids: Vec<_> = results
            .into_iter()
            .map(|record| record.unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
