use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::SequenceStore;
use crate::error::StoreError;
use crate::sequence::StoredTimer;

/// In-process store. Can be switched into a failing mode to exercise the
/// fail-open paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Vec<StoredTimer>>>,
    failing: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let store = Self::default();
        store.failing.set(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl SequenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<StoredTimer>>, StoreError> {
        if self.failing.get() {
            return Err(StoreError::Unavailable);
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, timers: &[StoredTimer]) -> Result<(), StoreError> {
        if self.failing.get() {
            return Err(StoreError::Unavailable);
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), timers.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl<S: SequenceStore + ?Sized> SequenceStore for std::rc::Rc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<StoredTimer>>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, timers: &[StoredTimer]) -> Result<(), StoreError> {
        (**self).set(key, timers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::TimerId;

    #[test]
    fn round_trips_and_counts_writes() {
        let store = MemoryStore::new();
        assert!(store.get("seq").unwrap().is_none());
        let timers = vec![StoredTimer {
            id: TimerId::new(),
            duration_seconds: 30,
        }];
        store.set("seq", &timers).unwrap();
        assert_eq!(store.get("seq").unwrap(), Some(timers));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn failing_store_errors() {
        let store = MemoryStore::failing();
        assert!(matches!(store.get("seq"), Err(StoreError::Unavailable)));
        assert!(store.set("seq", &[]).is_err());
        assert_eq!(store.writes(), 0);
    }
}
