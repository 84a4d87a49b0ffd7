//! Rollback snapshots, one per document.

use super::Table;
use crate::types::Backup;

/// Holds the most recent [`Backup`] for each document.
///
/// Only one generation is kept: every `put` replaces the previous snapshot.
#[derive(Debug, Clone)]
pub struct BackupStore {
    backups: Table<Backup>,
}

impl BackupStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            backups: Table::new(),
        }
    }

    /// Latest snapshot for `id`.
    pub fn get(&self, id: &str) -> Option<Backup> {
        self.backups.get(id)
    }

    /// Replace the snapshot for the backup's id.
    pub fn put(&self, backup: Backup) {
        self.backups.insert(backup.id.clone(), backup);
    }
}

impl Default for BackupStore {
    fn default() -> Self {
        Self::new()
    }
}
