use crate::record::RecordSet;
use std::sync::{Arc, PoisonError, RwLock};

/// Holder of the record set currently being served.
///
/// Readers take a cheap `Arc` clone and drop the lock straight away; an upload
/// builds its set elsewhere and publishes it with one swap, so nobody ever
/// sees a half-built set.
#[derive(Debug, Default)]
pub struct RecordStore {
    current: RwLock<Arc<RecordSet>>,
}

impl RecordStore {
    pub fn new(initial: RecordSet) -> Self {
        RecordStore {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn get(&self) -> Arc<RecordSet> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publish `set`, returning how many records are now served
    pub fn replace(&self, set: RecordSet) -> usize {
        let count = set.len();
        let next = Arc::new(set);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
        count
    }

    pub fn len(&self) -> usize {
        self.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.get().is_empty()
    }
}
