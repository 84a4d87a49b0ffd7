#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Differential Synchronization
//!
//! Keeps copies of a document convergent across peers (client/server or peer/peer)
//! even when patch messages arrive out of order or get lost, without a central lock
//! and without shipping the full document on every change.
//!
//! ## Overview
//!
//! Every document has four records:
//!
//! 1. **Content** - the authoritative current value
//! 2. **Shadow** - the last state both peers agree on, with a client/server version pair
//! 3. **Backup** - one rollback snapshot of the shadow, for recovering from lost acks
//! 4. **Pending edits** - local edits the peer has not confirmed yet
//!
//! A local change becomes a [`PatchMessage`] via [`SyncEngine::diff`]. A received
//! message goes through [`SyncEngine::patch`], which decides for each edit whether to
//! apply it, discard it as a duplicate, or roll back to the backup and replay it.
//!
//! ## Key Features
//!
//! - **Pluggable diffs**: any [`Differ`](diff::Differ) works; a JSON Patch differ is built in
//! - **Pending edits**: unacknowledged edits ride along on the next `diff`; this
//!   tolerates duplicate delivery but does not recover a lost message (see
//!   [`PendingPolicy`])
//! - **Rollback**: a stale shadow is rebuilt from its backup
//! - **Seeding**: [`SyncEngine::seed`] bootstraps divergent initial content
//! - **Stable wire format**: [`protocol`] encodes messages byte-for-byte reproducibly
//!
//! ## Usage
//!
//! ```
//! use diffsync::{Document, EngineConfig, SyncEngine};
//! use diffsync::protocol::{decode_message, encode_message};
//! use serde_json::json;
//!
//! let client = SyncEngine::with_config(EngineConfig::new("client"));
//! let server = SyncEngine::with_config(EngineConfig::new("server"));
//!
//! let doc = Document::new("d1", json!({"text": "Hello"}));
//! client.add_document(doc.clone());
//! server.add_document(doc);
//!
//! // Local edit on the client
//! let msg = client.diff(&Document::new("d1", json!({"text": "Hello World"}))).unwrap();
//!
//! // Ship it over any transport
//! let wire = encode_message(&msg).unwrap();
//! let report = server.patch(&decode_message(&wire).unwrap()).unwrap();
//!
//! assert!(report.is_clean());
//! assert_eq!(report.content, json!({"text": "Hello World"}));
//! ```
//!
//! ## Module Structure
//!
//! - **[types]** - Documents, shadows, backups, edits and patch messages
//! - **[error]** - Error types and result handling
//! - **[diff]** - The diff/patch capability and the built-in JSON Patch differ
//! - **[store]** - Per-document record stores
//! - **[engine]** - The reconciliation engine
//! - **[protocol]** - Wire encoding of patch messages

pub mod diff;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod store;
pub mod types;

pub use diff::{DiffSet, Differ, JsonPatchDiffer};
pub use engine::{EditOutcome, EngineConfig, PatchReport, PendingPolicy, SyncEngine};
pub use error::{Result, SyncError};
pub use types::{Backup, ClientId, DocId, Document, Edit, MessageType, PatchMessage, PendingEdits, Shadow};
