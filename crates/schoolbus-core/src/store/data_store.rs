// ── Central snapshot store ──
//
// Owns the one authoritative `Snapshot`. Readers load it lock-free via
// `ArcSwap`; the mutation gateway replaces it wholesale and the new
// snapshot is broadcast to subscribers through a `watch` channel.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::Snapshot;
use crate::stream::SnapshotStream;

pub struct DataStore {
    current: ArcSwap<Snapshot>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    version: watch::Sender<u64>,
    last_load: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::with_snapshot(Snapshot::default())
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let snapshot = Arc::new(snapshot);
        let (snapshot_tx, _) = watch::channel(Arc::clone(&snapshot));
        let (version, _) = watch::channel(0);
        let (last_load, _) = watch::channel(None);

        Self {
            current: ArcSwap::new(snapshot),
            snapshot_tx,
            version,
            last_load,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The current snapshot. Holding the `Arc` pins that version; later
    /// mutations never change it.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Monotonic counter bumped on every publish.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn last_load(&self) -> Option<DateTime<Utc>> {
        *self.last_load.borrow()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.snapshot_tx.subscribe())
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Replace the snapshot wholesale and notify subscribers.
    pub(crate) fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));
        self.snapshot_tx.send_replace(Arc::clone(&snapshot));
        self.version.send_modify(|v| *v += 1);
        snapshot
    }

    /// Replace the snapshot after a full load from the source.
    pub(crate) fn replace_loaded(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        self.last_load.send_replace(Some(Utc::now()));
        self.publish(snapshot)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::demo;

    #[test]
    fn publish_swaps_without_touching_held_snapshot() {
        let store = DataStore::with_snapshot(demo::snapshot());
        let held = store.snapshot();

        store.publish(Snapshot::default());

        assert_eq!(held.buses.len(), 7);
        assert!(store.snapshot().buses.is_empty());
        assert_eq!(store.version(), 1);
    }

    #[tokio::test]
    async fn subscribers_see_published_snapshot() {
        let store = DataStore::new();
        let mut stream = store.subscribe();

        store.replace_loaded(demo::snapshot());

        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.buses.len(), 7);
        assert!(store.last_load().is_some());
    }

    #[test]
    fn late_subscriber_starts_from_latest_snapshot() {
        let store = DataStore::new();

        store.replace_loaded(demo::snapshot());
        let stream = store.subscribe();

        assert_eq!(stream.current().buses.len(), 7);
        assert_eq!(stream.latest().buses.len(), 7);
        assert!(store.last_load().is_some());
    }
}
