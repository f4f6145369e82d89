//! Debounced snapshot autosave.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::questionnaire::AnswerSet;
use crate::store::SnapshotStore;

/// Writes the answer snapshot `debounce` after the last mutation.
///
/// Each `schedule` aborts the pending write, so a burst of edits produces
/// one write carrying the final state.
pub struct Autosave {
    snapshots: SnapshotStore,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Autosave {
    pub fn new(snapshots: SnapshotStore, debounce: Duration) -> Self {
        Self {
            snapshots,
            debounce,
            pending: None,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, answers: &AnswerSet) {
        self.cancel();
        let snapshots = self.snapshots.clone();
        let debounce = self.debounce;
        let answers = answers.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            snapshots.save_answers(&answers);
            debug!("Answer snapshot autosaved");
        }));
    }

    /// Write now, dropping any pending write.
    pub fn flush(&mut self, answers: &AnswerSet) {
        self.cancel();
        self.snapshots.save_answers(answers);
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::store::{KeyValueStore, MemoryStore, Restored};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts writes on top of a memory store.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    fn named(first: &str) -> AnswerSet {
        AnswerSet {
            first_name: first.into(),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_coalesce_into_one_write() {
        let store = Arc::new(CountingStore::default());
        let snapshots = SnapshotStore::new(store.clone());
        let mut autosave = Autosave::new(snapshots.clone(), Duration::from_millis(500));

        for name in ["J", "Ja", "Jan", "Jane"] {
            autosave.schedule(&named(name));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert!(autosave.is_pending());

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(snapshots.load_answers(), Restored::Loaded(named("Jane")));
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_immediately_and_cancels_pending() {
        let store = Arc::new(CountingStore::default());
        let snapshots = SnapshotStore::new(store.clone());
        let mut autosave = Autosave::new(snapshots.clone(), Duration::from_millis(500));

        autosave.schedule(&named("Old"));
        autosave.flush(&named("New"));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(snapshots.load_answers(), Restored::Loaded(named("New")));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_write() {
        let store = Arc::new(CountingStore::default());
        let mut autosave = Autosave::new(SnapshotStore::new(store.clone()), Duration::from_millis(500));
        autosave.schedule(&named("Jane"));
        autosave.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }
}
