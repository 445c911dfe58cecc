use crate::error::Result;
use crate::types::Record;

/// A read-only record collection that can be filtered by a query line.
pub trait RecordSearch: Send + Sync {
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> Option<&Record>;
    /// Indices of matching records in dataset order.
    fn search(&self, query: &str) -> Result<Vec<usize>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Updated by the host after it writes a record, e.g. to refresh caches used
/// for autocompletion. Observers are never consulted during a search.
pub trait RecordObserver {
    fn observe(&mut self, record: &Record);
}
