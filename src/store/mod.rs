//! In-memory record stores keyed by document id.
//!
//! The engine keeps four records per document, each in its own store:
//!
//! | Store | Record | Written by |
//! |-------|--------|------------|
//! | [`ContentStore`] | [`Document`](crate::types::Document) | `add_document`, `patch_document` |
//! | [`ShadowStore`] | [`Shadow`](crate::types::Shadow) | `add_document`, `diff`, `patch_shadow` |
//! | [`BackupStore`] | [`Backup`](crate::types::Backup) | `add_document`, `patch` |
//! | [`PendingQueue`] | [`PendingEdits`](crate::types::PendingEdits) | `diff`, `patch_shadow`, `restore_backup` |
//!
//! # Thread Safety
//!
//! Every store is a cheap handle over `Arc<RwLock<HashMap<..>>>`. Cloning a store
//! shares the same underlying map. Readers never block each other.
//!
//! Individual reads and writes are atomic, but a `diff` or `patch` touches several
//! stores. [`DocumentLocks`] hands out one mutex per document id so those
//! multi-store updates stay atomic per document.

mod backup;
mod content;
mod locks;
mod queue;
mod shadow;

pub use backup::BackupStore;
pub use content::ContentStore;
pub use locks::DocumentLocks;
pub use queue::PendingQueue;
pub use shadow::ShadowStore;

use crate::types::DocId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared map from document id to one record type.
#[derive(Debug)]
pub(crate) struct Table<T> {
    records: Arc<RwLock<HashMap<DocId, T>>>,
}

impl<T: Clone> Table<T> {
    pub(crate) fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Copy of the record for `id`.
    pub(crate) fn get(&self, id: &str) -> Option<T> {
        self.records.read().get(id).cloned()
    }

    /// Insert or overwrite the record for `id`.
    pub(crate) fn insert(&self, id: DocId, record: T) {
        self.records.write().insert(id, record);
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.records.read().contains_key(id)
    }

    /// Mutate the record for `id` in place, if present.
    pub(crate) fn update<R>(&self, id: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.records.write().get_mut(id).map(f)
    }

    /// All ids in arbitrary order.
    pub(crate) fn ids(&self) -> Vec<DocId> {
        self.records.read().keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.read().len()
    }
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_insert_and_get() {
        let table: Table<u32> = Table::new();
        assert!(table.get("a").is_none());
        table.insert("a".to_string(), 1);
        assert_eq!(table.get("a"), Some(1));
        assert!(table.contains("a"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_table_update() {
        let table: Table<u32> = Table::new();
        assert_eq!(table.update("a", |v| *v += 1), None);
        table.insert("a".to_string(), 1);
        assert_eq!(table.update("a", |v| { *v += 1; *v }), Some(2));
    }

    #[test]
    fn test_table_clone_shares_records() {
        let table: Table<u32> = Table::new();
        let other = table.clone();
        table.insert("a".to_string(), 7);
        assert_eq!(other.get("a"), Some(7));
        assert_eq!(other.ids(), vec!["a".to_string()]);
    }
}
