//! Shadow state machine, backup restore and document catch-up.
//!
//! Each incoming edit is matched against the current shadow; the first state that
//! fits wins:
//!
//! | # | State | Condition | Action |
//! |---|-------|-----------|--------|
//! | 1 | Stale shadow | `edit.cv < shadow.cv`, not seeded | rebuild from backup |
//! | 2 | Duplicate | `edit.sv < shadow.sv`, not seeded | prune pending queue |
//! | 3 | Applicable | versions equal, or seeded | apply, bump `sv` (seeded: `cv = 0`) |
//! | 4 | No match | otherwise | report as [`EditOutcome::Skipped`] |
//!
//! State 1 means the peer never saw our last message: it is still answering the
//! shadow we snapshotted as the backup, so we roll back to that snapshot.

use super::{EditOutcome, SyncEngine};
use crate::diff::Differ;
use crate::error::{Result, SyncError};
use crate::types::{Edit, PatchMessage, Shadow};
use serde_json::Value;
use tracing::{debug, error, warn};

impl<D: Differ> SyncEngine<D> {
    /// Run every edit of `msg` through the shadow state machine.
    ///
    /// Returns the shadow after the last edit. The document itself is not touched;
    /// see [`patch_document`](Self::patch_document).
    ///
    /// # Errors
    ///
    /// - [`SyncError::NoSuchDocument`] if `msg.id` was never added
    /// - [`SyncError::VersionMismatch`] if a rollback cannot line up with the backup
    pub fn patch_shadow(&self, msg: &PatchMessage) -> Result<Shadow> {
        let lock = self.document_lock(&msg.id)?;
        let _guard = lock.lock();

        self.reconcile_shadow(msg).map(|(shadow, _)| shadow)
    }

    /// Rebuild a stale shadow from the backup and apply `edit` on top.
    ///
    /// The restored shadow takes the backup's client version and the current shadow's
    /// server version plus one. Every queued pending edit for the document is
    /// discarded.
    ///
    /// # Errors
    ///
    /// [`SyncError::VersionMismatch`] if `edit`'s client version differs from the
    /// backup's. The document must then be re-seeded.
    pub fn restore_backup(&self, shadow: &Shadow, edit: &Edit) -> Result<Shadow> {
        let lock = self.document_lock(&shadow.id)?;
        let _guard = lock.lock();

        self.restore_from_backup(shadow, edit)
    }

    /// Bring the document in line with `shadow` and return its new content.
    ///
    /// # Errors
    ///
    /// [`SyncError::NoSuchDocument`] if no document is stored under `shadow.id`.
    pub fn patch_document(&self, shadow: &Shadow) -> Result<Value> {
        let lock = self.document_lock(&shadow.id)?;
        let _guard = lock.lock();

        self.apply_shadow_to_document(shadow)
    }

    // Callers below hold the document lock.

    pub(super) fn reconcile_shadow(&self, msg: &PatchMessage) -> Result<(Shadow, Vec<EditOutcome>)> {
        let mut shadow = self.require_shadow(&msg.id)?;
        let mut outcomes = Vec::with_capacity(msg.edits.len());

        for edit in &msg.edits {
            let outcome = if !edit.is_seeded()
                && i128::from(edit.client_version) < i128::from(shadow.client_version)
            {
                shadow = self.restore_from_backup(&shadow, edit)?;
                EditOutcome::Restored
            } else if !edit.is_seeded() && edit.server_version < shadow.server_version {
                self.pending.acknowledge(&msg.id, edit.client_version);
                EditOutcome::Discarded
            } else if edit.is_seeded()
                || (edit.server_version == shadow.server_version
                    && edit.client_version() == Some(shadow.client_version))
            {
                shadow.content = self.differ.apply(&shadow.content, &edit.diffs)?;
                if edit.is_seeded() {
                    shadow.client_version = 0;
                } else {
                    shadow.server_version += 1;
                }
                self.shadows.put(shadow.clone());
                self.pending.acknowledge(&msg.id, edit.client_version);
                EditOutcome::Applied
            } else {
                if self.config.enable_logging {
                    warn!(
                        id = %msg.id,
                        edit_client_version = edit.client_version,
                        edit_server_version = edit.server_version,
                        shadow_client_version = shadow.client_version,
                        shadow_server_version = shadow.server_version,
                        "Skipping edit: no reconciliation state matches"
                    );
                }
                EditOutcome::Skipped
            };

            if self.config.enable_logging {
                debug!(
                    id = %msg.id,
                    client_version = edit.client_version,
                    server_version = edit.server_version,
                    ?outcome,
                    "Processed edit"
                );
            }
            outcomes.push(outcome);
        }

        Ok((shadow, outcomes))
    }

    pub(super) fn restore_from_backup(&self, shadow: &Shadow, edit: &Edit) -> Result<Shadow> {
        let backup = self
            .backups
            .get(&shadow.id)
            .ok_or_else(|| SyncError::NoSuchDocument(shadow.id.clone()))?;

        if edit.client_version() != Some(backup.client_version) {
            if self.config.enable_logging {
                error!(
                    id = %shadow.id,
                    edit_client_version = edit.client_version,
                    backup_client_version = backup.client_version,
                    "Cannot restore backup: version mismatch"
                );
            }
            return Err(SyncError::VersionMismatch {
                edit: edit.client_version,
                backup: backup.client_version,
            });
        }

        let restored = Shadow {
            id: shadow.id.clone(),
            client_id: shadow.client_id.clone(),
            client_version: backup.client_version,
            server_version: shadow.server_version + 1,
            content: self.differ.apply(&backup.content, &edit.diffs)?,
        };

        let dropped = self.pending.clear(&shadow.id);
        self.shadows.put(restored.clone());

        if self.config.enable_logging {
            debug!(
                id = %shadow.id,
                client_version = restored.client_version,
                server_version = restored.server_version,
                dropped,
                "Restored shadow from backup"
            );
        }

        Ok(restored)
    }

    pub(super) fn apply_shadow_to_document(&self, shadow: &Shadow) -> Result<Value> {
        let document = self
            .content
            .get(&shadow.id)
            .ok_or_else(|| SyncError::NoSuchDocument(shadow.id.clone()))?;

        let diffs = self.differ.diff(&document.content, &shadow.content)?;
        let content = self.differ.apply(&document.content, &diffs)?;
        self.content.set_content(&shadow.id, content.clone());

        Ok(content)
    }
}
