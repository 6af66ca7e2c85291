use crate::error::{Error, Result};
use crate::eval;
use crate::index::{InvertedIndex, ResultSet};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, replaceable reference to the current index.
///
/// Readers clone the inner `Arc` and evaluate without holding the lock. A rebuild
/// happens outside the lock and only the pointer swap is exclusive, so no reader sees
/// a partially built index.
#[derive(Debug, Default, Clone)]
pub struct IndexHandle {
    current: Arc<RwLock<Option<Arc<InvertedIndex>>>>,
}

impl IndexHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(index: InvertedIndex) -> Self {
        let handle = Self::new();
        handle.replace(index);
        handle
    }

    /// Install `index`, returning the one it replaces.
    pub fn replace(&self, index: InvertedIndex) -> Option<Arc<InvertedIndex>> {
        self.current.write().replace(Arc::new(index))
    }

    /// Snapshot of the current index.
    pub fn get(&self) -> Result<Arc<InvertedIndex>> {
        self.current.read().clone().ok_or(Error::EmptyIndex)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn query(&self, input: &str) -> Result<ResultSet> {
        let index = self.get()?;
        eval::query(&index, input)
    }
}
