use crate::index::InvertedIndex;
use crate::query::{search, ScoredResult};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, swappable reference to the index currently being served.
///
/// Readers take a [`snapshot`](Self::snapshot) and query it without holding
/// the lock, so a concurrent [`swap`](Self::swap) never shows them a
/// partially built index.
#[derive(Clone, Default)]
pub struct IndexHandle {
    current: Arc<RwLock<Arc<InvertedIndex>>>,
}

impl IndexHandle {
    pub fn new(index: InvertedIndex) -> Self {
        Self { current: Arc::new(RwLock::new(Arc::new(index))) }
    }

    pub fn snapshot(&self) -> Arc<InvertedIndex> {
        self.current.read().clone()
    }

    /// Install a fully built index; returns the one it replaced.
    pub fn swap(&self, index: InvertedIndex) -> Arc<InvertedIndex> {
        let next = Arc::new(index);
        let prev = std::mem::replace(&mut *self.current.write(), next);
        tracing::info!(num_docs = self.current.read().num_docs(), "index swapped");
        prev
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredResult> {
        search(&self.snapshot(), query, limit)
    }
}
