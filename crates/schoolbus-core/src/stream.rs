// ── Reactive snapshot stream ──
//
// Subscription type for consuming snapshot replacements from the DataStore.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::Snapshot;

/// A subscription to the store's snapshot.
///
/// Provides point-in-time access and change notification via
/// [`changed`](Self::changed) or by converting into a `Stream`.
pub struct SnapshotStream {
    current: Arc<Snapshot>,
    receiver: watch::Receiver<Arc<Snapshot>>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Snapshot>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation time (or at the last `changed`).
    pub fn current(&self) -> &Arc<Snapshot> {
        &self.current
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> Arc<Snapshot> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next replacement. `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<Arc<Snapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding each published snapshot.
pub struct SnapshotWatchStream {
    inner: WatchStream<Arc<Snapshot>>,
}

impl Stream for SnapshotWatchStream {
    type Item = Arc<Snapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::StreamExt;

    use crate::store::{DataStore, Snapshot, demo};

    #[tokio::test]
    async fn stream_yields_current_then_replacements() {
        let store = DataStore::with_snapshot(demo::snapshot());
        let mut stream = store.subscribe().into_stream();

        let first = stream.next().await.unwrap();
        assert_eq!(first.buses.len(), 7);

        store.publish(Snapshot::default());
        let second = stream.next().await.unwrap();
        assert!(second.buses.is_empty());
    }

    #[tokio::test]
    async fn changed_advances_current() {
        let store = DataStore::with_snapshot(demo::snapshot());
        let mut sub = store.subscribe();
        assert_eq!(sub.current().buses.len(), 7);

        store.publish(Snapshot::default());
        let next = sub.changed().await.unwrap();
        assert!(next.buses.is_empty());
        assert!(sub.current().buses.is_empty());
        assert!(sub.latest().buses.is_empty());
    }
}
