use core::pin::Pin;
use core::task::{Context, Poll};

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use tracing::warn;

use crate::error::IngestResult;

pin_project! {
    /// A stream adapter that regroups a fallible stream of items into full batches.
    ///
    /// Items are pulled from the underlying stream one at a time and buffered until the
    /// batch size is reached, at which point the buffer is emitted as one batch. The batch
    /// size is independent of any batching the underlying stream does internally.
    ///
    /// When the underlying stream ends, a partial trailing buffer is dropped rather than
    /// emitted; the drop is logged with the number of discarded items. An `Err` item from
    /// the underlying stream is forwarded immediately, discarding the current buffer, and
    /// ends the stream.
    #[must_use = "streams do nothing unless polled"]
    #[derive(Debug)]
    pub struct FullBatchStream<T, S: Stream<Item = IngestResult<T>>> {
        #[pin]
        stream: S,
        items: Vec<T>,
        batch_size: usize,
        inner_stream_ended: bool,
    }
}

impl<T, S: Stream<Item = IngestResult<T>>> FullBatchStream<T, S> {
    /// Creates a new [`FullBatchStream`] emitting batches of exactly `batch_size` items.
    pub fn wrap(stream: S, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be greater than zero");

        FullBatchStream {
            stream,
            items: Vec::with_capacity(batch_size),
            batch_size,
            inner_stream_ended: false,
        }
    }
}

impl<T, S: Stream<Item = IngestResult<T>>> Stream for FullBatchStream<T, S> {
    type Item = IngestResult<Vec<T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Fast path: once the inner stream has ended or failed, we're done.
        if *this.inner_stream_ended {
            return Poll::Ready(None);
        }

        loop {
            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(Ok(item)) => {
                    // Pre-allocate batch capacity when starting to collect a new batch.
                    if this.items.is_empty() {
                        this.items.reserve_exact(*this.batch_size);
                    }

                    this.items.push(item);

                    if this.items.len() >= *this.batch_size {
                        return Poll::Ready(Some(Ok(std::mem::take(this.items))));
                    }
                }
                Some(Err(err)) => {
                    // The buffered items belong to a batch that will never fill; the error
                    // takes their place in the output.
                    *this.inner_stream_ended = true;
                    this.items.clear();

                    return Poll::Ready(Some(Err(err)));
                }
                None => {
                    *this.inner_stream_ended = true;

                    if !this.items.is_empty() {
                        warn!(
                            discarded = this.items.len(),
                            "dropping partial trailing batch"
                        );
                        this.items.clear();
                    }

                    return Poll::Ready(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ingest_error;
    use futures::StreamExt;
    use futures::future::poll_fn;
    use futures::stream;

    fn ok_items(count: usize) -> Vec<IngestResult<usize>> {
        (1..=count).map(Ok).collect()
    }

    #[tokio::test]
    async fn emits_only_full_batches() {
        // 5 items with batch size 2: two full batches, the trailing item is dropped.
        let mut stream = Box::pin(FullBatchStream::wrap(stream::iter(ok_items(5)), 2));

        assert_eq!(stream.next().await.unwrap().unwrap(), vec![1, 2]);
        assert_eq!(stream.next().await.unwrap().unwrap(), vec![3, 4]);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn emits_floor_of_n_over_s_batches() {
        for (n, s, expected_batches) in [(6, 2, 3), (7, 3, 2), (2, 5, 0), (4, 4, 1)] {
            let batches: Vec<_> = FullBatchStream::wrap(stream::iter(ok_items(n)), s)
                .collect()
                .await;

            assert_eq!(batches.len(), expected_batches, "n={n} s={s}");
            for batch in batches {
                assert_eq!(batch.unwrap().len(), s);
            }
        }
    }

    #[tokio::test]
    async fn forwards_upstream_error_and_ends() {
        let items: Vec<IngestResult<usize>> = vec![
            Ok(1),
            Err(ingest_error!(
                ErrorKind::SourceRequestFailed,
                "scripted failure"
            )),
            Ok(2),
        ];
        let mut stream = Box::pin(FullBatchStream::wrap(stream::iter(items), 2));

        let failure = stream.next().await.unwrap();
        assert_eq!(
            failure.unwrap_err().kind(),
            ErrorKind::SourceRequestFailed
        );

        // The buffered item before the error is discarded and the stream is over.
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn suspends_until_a_batch_fills() {
        let (tx, rx) = futures::channel::mpsc::unbounded::<IngestResult<usize>>();
        let mut stream = Box::pin(FullBatchStream::wrap(rx, 2));

        tx.unbounded_send(Ok(1)).unwrap();

        // One buffered item out of two: the adapter must stay pending.
        poll_fn(|cx| match stream.as_mut().poll_next(cx) {
            Poll::Pending => Poll::Ready(()),
            _ => panic!("expected pending with a half-filled batch"),
        })
        .await;

        tx.unbounded_send(Ok(2)).unwrap();

        let batch = poll_fn(|cx| stream.as_mut().poll_next(cx)).await;
        assert_eq!(batch.unwrap().unwrap(), vec![1, 2]);
    }
}
