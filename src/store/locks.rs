//! One mutex per document id.

use crate::types::DocId;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of per-document mutexes.
///
/// Holding a document's lock makes its content, shadow, backup and queue one unit
/// for the duration of a `diff` or `patch`. Calls on different documents do not
/// contend.
///
/// # Examples
///
/// ```
/// use diffsync::store::DocumentLocks;
///
/// let locks = DocumentLocks::new();
/// let lock = locks.get("d1");
/// let _guard = lock.lock();
/// // ... read-modify-write the records of "d1" ...
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentLocks {
    locks: Arc<RwLock<HashMap<DocId, Arc<Mutex<()>>>>>,
}

impl DocumentLocks {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex guarding `id`, created on first use.
    ///
    /// Only call this for ids being added; use [`existing`](Self::existing) for
    /// ids that arrive from a peer so unknown ids never allocate a lock.
    pub fn get(&self, id: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().get(id) {
            return Arc::clone(lock);
        }

        self.locks
            .write()
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// The mutex guarding `id`, if one was created.
    pub fn existing(&self, id: &str) -> Option<Arc<Mutex<()>>> {
        self.locks.read().get(id).cloned()
    }

    /// Number of registered locks.
    pub fn len(&self) -> usize {
        self.locks.read().len()
    }

    /// Whether no lock has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_id_same_lock() {
        let locks = DocumentLocks::new();
        let a = locks.get("d1");
        let b = locks.get("d1");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_different_ids_do_not_contend() {
        let locks = DocumentLocks::new();
        let a = locks.get("d1");
        let b = locks.get("d2");
        let _guard = a.lock();
        assert!(b.try_lock().is_some());
        assert!(a.try_lock().is_none());
    }

    #[test]
    fn test_existing_does_not_create() {
        let locks = DocumentLocks::new();
        assert!(locks.existing("d1").is_none());
        assert!(locks.is_empty());

        let created = locks.get("d1");
        let found = locks.existing("d1").unwrap();
        assert!(Arc::ptr_eq(&created, &found));
        assert_eq!(locks.len(), 1);
    }
}
