//! The reconciliation engine.
//!
//! [`SyncEngine`] owns the four per-document stores and drives them with an injected
//! [`Differ`]. Its surface is small:
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`add_document`](SyncEngine::add_document) | initialise content, shadow, backup and queue |
//! | [`diff`](SyncEngine::diff) | turn a local change into a [`PatchMessage`] |
//! | [`patch`](SyncEngine::patch) | reconcile an incoming [`PatchMessage`] |
//! | [`seed`](SyncEngine::seed) | re-initialise and emit a seeded bootstrap edit |
//!
//! `patch` is built from [`patch_shadow`](SyncEngine::patch_shadow),
//! [`restore_backup`](SyncEngine::restore_backup) and
//! [`patch_document`](SyncEngine::patch_document), which are public as well.
//!
//! # Data Flow
//!
//! ```text
//! local change ──► diff ──► PatchMessage ──► (transport) ──► patch
//!                   │                                          │
//!             Content+Shadow                          patch_shadow (per edit)
//!                                                              │
//!                                                       patch_document
//!                                                              │
//!                                                         new Backup
//! ```
//!
//! # Examples
//!
//! ```
//! use diffsync::{Document, EngineConfig, SyncEngine};
//! use serde_json::json;
//!
//! let client = SyncEngine::with_config(EngineConfig::new("client"));
//! let server = SyncEngine::with_config(EngineConfig::new("server"));
//!
//! let doc = Document::new("d1", json!({"text": "Hello"}));
//! client.add_document(doc.clone());
//! server.add_document(doc);
//!
//! let msg = client
//!     .diff(&Document::new("d1", json!({"text": "Hello World"})))
//!     .unwrap();
//! server.patch(&msg).unwrap();
//!
//! assert_eq!(
//!     server.get_document("d1").unwrap().content,
//!     json!({"text": "Hello World"})
//! );
//! ```
//!
//! # Concurrency
//!
//! All operations are synchronous. Calls for the same document id are serialised by
//! a per-document lock; calls for different documents run independently.

mod config;
mod reconcile;
mod report;

pub use config::{EngineConfig, PendingPolicy};
pub use report::{EditOutcome, PatchReport};

use crate::diff::{Differ, JsonPatchDiffer};
use crate::error::{Result, SyncError};
use crate::store::{BackupStore, ContentStore, DocumentLocks, PendingQueue, ShadowStore};
use crate::types::{Backup, ClientId, DocId, Document, Edit, PatchMessage, Shadow};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Differential synchronization engine for a set of documents.
///
/// Holds exactly one shadow per document id, so each document can be synchronised
/// with a single peer at a time.
pub struct SyncEngine<D: Differ = JsonPatchDiffer> {
    differ: D,
    config: EngineConfig,
    content: ContentStore,
    shadows: ShadowStore,
    backups: BackupStore,
    pending: PendingQueue,
    locks: DocumentLocks,
}

impl SyncEngine<JsonPatchDiffer> {
    /// Engine with the built-in JSON Patch differ and default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine with the built-in JSON Patch differ.
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_differ(JsonPatchDiffer::new(), config)
    }
}

impl Default for SyncEngine<JsonPatchDiffer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Differ> SyncEngine<D> {
    /// Engine driven by a custom diff/patch primitive.
    pub fn with_differ(differ: D, config: EngineConfig) -> Self {
        Self {
            differ,
            config,
            content: ContentStore::new(),
            shadows: ShadowStore::new(),
            backups: BackupStore::new(),
            pending: PendingQueue::new(),
            locks: DocumentLocks::new(),
        }
    }

    /// The configuration this engine was built with.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The injected diff primitive.
    #[inline]
    pub fn differ(&self) -> &D {
        &self.differ
    }

    // ========== Operations ==========

    /// Start tracking a document.
    ///
    /// Content, shadow (versions 0/0) and backup (client version 0) all become copies
    /// of `doc.content`, and the pending queue is emptied. Existing records for the
    /// id are overwritten, not merged.
    pub fn add_document(&self, doc: Document) {
        let lock = self.locks.get(&doc.id);
        let _guard = lock.lock();

        let client_id = self.config.client_id.clone();
        self.initialize(doc, client_id);
    }

    /// Turn a locally changed document into an outgoing patch message.
    ///
    /// The message carries every still-pending edit (oldest first) followed by the
    /// new edit, which is computed against the current shadow. Afterwards the shadow
    /// holds `doc.content` and its client version has advanced by one.
    ///
    /// # Errors
    ///
    /// - [`SyncError::NoSuchDocument`] if `doc.id` was never added
    /// - [`SyncError::Patch`] if the differ fails
    pub fn diff(&self, doc: &Document) -> Result<PatchMessage> {
        let lock = self.document_lock(&doc.id)?;
        let _guard = lock.lock();

        let mut shadow = self.require_shadow(&doc.id)?;
        let diffs = self.differ.diff(&shadow.content, &doc.content)?;
        let edit = Edit::against(&shadow, diffs);

        shadow.client_version += 1;
        shadow.content = doc.content.clone();
        self.shadows.put(shadow.clone());
        self.content.set_content(&doc.id, doc.content.clone());

        let mut edits = self.pending.edits(&doc.id);
        edits.push(edit.clone());

        if self.config.pending_policy == PendingPolicy::Provisional {
            self.pending.push(&doc.id, &shadow.client_id, edit);
        }

        if self.config.enable_logging {
            debug!(
                id = %doc.id,
                client_version = shadow.client_version,
                server_version = shadow.server_version,
                edits = edits.len(),
                "Prepared patch message"
            );
        }

        Ok(PatchMessage::new(doc.id.clone(), shadow.client_id, edits))
    }

    /// Reconcile an incoming patch message.
    ///
    /// Runs the shadow state machine over every edit, brings the document in line
    /// with the resulting shadow, then snapshots that shadow as the new backup.
    ///
    /// # Errors
    ///
    /// - [`SyncError::NoSuchDocument`] if `msg.id` was never added
    /// - [`SyncError::VersionMismatch`] if a rollback cannot line up with the backup
    /// - [`SyncError::Patch`] if the differ fails
    pub fn patch(&self, msg: &PatchMessage) -> Result<PatchReport> {
        let lock = self.document_lock(&msg.id)?;
        let _guard = lock.lock();

        let (shadow, outcomes) = self.reconcile_shadow(msg)?;
        let content = self.apply_shadow_to_document(&shadow)?;
        self.backups.put(Backup::from_shadow(&shadow));

        let report = PatchReport {
            id: msg.id.clone(),
            outcomes,
            content,
        };

        if self.config.enable_logging {
            debug!(
                id = %msg.id,
                client_version = shadow.client_version,
                server_version = shadow.server_version,
                skipped = report.skipped(),
                "Applied patch message"
            );
        }

        Ok(report)
    }

    /// Re-initialise a document and produce a seeded bootstrap message.
    ///
    /// Local records are reset exactly as [`add_document`](Self::add_document) does,
    /// keeping the shadow's client id if one exists. The returned message holds one
    /// seeded edit (`clientVersion == -1`) that rebuilds `doc.content` from `null`,
    /// which the peer applies regardless of its shadow versions. The peer should have
    /// re-added the document so that both sides restart from versions 0/0.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Patch`] if the differ fails
    pub fn seed(&self, doc: Document) -> Result<PatchMessage> {
        let lock = self.locks.get(&doc.id);
        let _guard = lock.lock();

        let client_id = self
            .shadows
            .get(&doc.id)
            .map(|shadow| shadow.client_id)
            .unwrap_or_else(|| self.config.client_id.clone());

        let diffs = self.differ.diff(&Value::Null, &doc.content)?;
        let id = doc.id.clone();
        self.initialize(doc, client_id.clone());

        if self.config.enable_logging {
            debug!(id = %id, "Prepared seeded edit");
        }

        Ok(PatchMessage::new(id, client_id, vec![Edit::seeded(0, diffs)]))
    }

    // ========== Accessors ==========

    /// Current document for `id`.
    pub fn get_document(&self, id: &str) -> Option<Document> {
        self.content.get(id)
    }

    /// Current shadow for `id`.
    pub fn get_shadow(&self, id: &str) -> Option<Shadow> {
        self.shadows.get(id)
    }

    /// Current backup for `id`.
    pub fn get_backup(&self, id: &str) -> Option<Backup> {
        self.backups.get(id)
    }

    /// Edits awaiting acknowledgment for `id`, oldest first.
    pub fn pending(&self, id: &str) -> Vec<Edit> {
        self.pending.edits(id)
    }

    /// Whether `id` has been added.
    pub fn contains(&self, id: &str) -> bool {
        self.shadows.contains(id)
    }

    /// Ids of all tracked documents, in arbitrary order.
    pub fn documents(&self) -> Vec<DocId> {
        self.content.ids()
    }

    // ========== Internals ==========

    fn initialize(&self, doc: Document, client_id: ClientId) {
        let shadow = Shadow::new(doc.id.clone(), client_id.clone(), doc.content.clone());
        self.backups.put(Backup::from_shadow(&shadow));
        self.shadows.put(shadow);
        self.pending.reset(&doc.id, &client_id);
        self.content.put(doc);
    }

    /// Lock of a document that was added. Unknown ids never get a lock.
    pub(super) fn document_lock(&self, id: &str) -> Result<Arc<Mutex<()>>> {
        self.locks
            .existing(id)
            .ok_or_else(|| SyncError::NoSuchDocument(id.to_string()))
    }

    fn require_shadow(&self, id: &str) -> Result<Shadow> {
        self.shadows
            .get(id)
            .ok_or_else(|| SyncError::NoSuchDocument(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine(client_id: &str) -> SyncEngine {
        SyncEngine::with_config(EngineConfig::new(client_id))
    }

    #[test]
    fn test_add_document_initializes_records() {
        let engine = engine("alice");
        engine.add_document(Document::new("d1", json!({"text": "Hello"})));

        let shadow = engine.get_shadow("d1").unwrap();
        assert_eq!(shadow.client_id, "alice");
        assert_eq!(shadow.client_version, 0);
        assert_eq!(shadow.server_version, 0);
        assert_eq!(shadow.content, json!({"text": "Hello"}));

        let backup = engine.get_backup("d1").unwrap();
        assert_eq!(backup.client_version, 0);
        assert_eq!(backup.content, json!({"text": "Hello"}));

        assert_eq!(engine.get_document("d1").unwrap().content, json!({"text": "Hello"}));
        assert!(engine.pending("d1").is_empty());
        assert!(engine.contains("d1"));
        assert_eq!(engine.documents(), vec!["d1".to_string()]);
    }

    #[test]
    fn test_add_document_overwrites() {
        let engine = engine("alice");
        engine.add_document(Document::new("d1", json!("a")));
        engine.diff(&Document::new("d1", json!("b"))).unwrap();

        engine.add_document(Document::new("d1", json!("c")));
        let shadow = engine.get_shadow("d1").unwrap();
        assert_eq!(shadow.client_version, 0);
        assert_eq!(shadow.content, json!("c"));
        assert!(engine.pending("d1").is_empty());
    }

    #[test]
    fn test_diff_unknown_document() {
        let engine = engine("alice");
        let result = engine.diff(&Document::new("missing", json!(1)));
        assert!(matches!(result, Err(SyncError::NoSuchDocument(id)) if id == "missing"));
    }

    #[test]
    fn test_unknown_ids_do_not_register_locks() {
        let engine = engine("alice");
        engine.add_document(Document::new("d1", json!(1)));
        assert_eq!(engine.locks.len(), 1);

        for i in 0..5 {
            let id = format!("junk-{}", i);
            let msg = PatchMessage::new(id.clone(), "peer", Vec::new());
            assert!(matches!(engine.patch(&msg), Err(SyncError::NoSuchDocument(_))));
            assert!(engine.diff(&Document::new(id, json!(2))).is_err());
        }
        assert_eq!(engine.locks.len(), 1);
    }

    #[test]
    fn test_diff_advances_shadow() {
        let engine = engine("alice");
        engine.add_document(Document::new("d1", json!({"text": "Hello"})));

        let msg = engine
            .diff(&Document::new("d1", json!({"text": "Hello World"})))
            .unwrap();
        assert_eq!(msg.id, "d1");
        assert_eq!(msg.client_id, "alice");
        assert_eq!(msg.edits.len(), 1);
        assert_eq!(msg.edits[0].client_version, 0);
        assert_eq!(msg.edits[0].server_version, 0);
        assert!(!msg.edits[0].diffs.is_empty());

        let shadow = engine.get_shadow("d1").unwrap();
        assert_eq!(shadow.client_version, 1);
        assert_eq!(shadow.content, json!({"text": "Hello World"}));
        assert_eq!(
            engine.get_document("d1").unwrap().content,
            json!({"text": "Hello World"})
        );
    }

    #[test]
    fn test_provisional_policy_resends_pending() {
        let engine = engine("alice");
        engine.add_document(Document::new("d1", json!({"n": 0})));

        engine.diff(&Document::new("d1", json!({"n": 1}))).unwrap();
        let msg = engine.diff(&Document::new("d1", json!({"n": 2}))).unwrap();

        let versions: Vec<i64> = msg.edits.iter().map(|e| e.client_version).collect();
        assert_eq!(versions, vec![0, 1]);
        assert_eq!(engine.pending("d1").len(), 2);
    }

    #[test]
    fn test_reactive_policy_does_not_queue() {
        let config = EngineConfig::new("alice").with_pending_policy(PendingPolicy::Reactive);
        let engine = SyncEngine::with_config(config);
        engine.add_document(Document::new("d1", json!({"n": 0})));

        engine.diff(&Document::new("d1", json!({"n": 1}))).unwrap();
        let msg = engine.diff(&Document::new("d1", json!({"n": 2}))).unwrap();

        assert_eq!(msg.edits.len(), 1);
        assert_eq!(msg.edits[0].client_version, 1);
        assert!(engine.pending("d1").is_empty());
    }

    #[test]
    fn test_seed_resets_and_emits_seeded_edit() {
        let engine = engine("alice");
        engine.add_document(Document::new("d1", json!("old")));
        engine.diff(&Document::new("d1", json!("older"))).unwrap();

        let msg = engine.seed(Document::new("d1", json!({"text": "fresh"}))).unwrap();
        assert_eq!(msg.edits.len(), 1);
        assert!(msg.edits[0].is_seeded());
        assert_eq!(msg.client_id, "alice");

        let shadow = engine.get_shadow("d1").unwrap();
        assert_eq!(shadow.client_version, 0);
        assert_eq!(shadow.content, json!({"text": "fresh"}));
        assert!(engine.pending("d1").is_empty());
    }
}
