//! Core synchronization types.
//!
//! These are the records the stores hold and the units exchanged between peers.
//! Field names serialize in camelCase so [`PatchMessage`] matches the wire format
//! byte for byte:
//!
//! ```text
//! {"msgType":"patch","id":"d1","clientId":"c1",
//!  "edits":[{"clientVersion":0,"serverVersion":0,"checksum":"","diffs":[...]}]}
//! ```

use crate::diff::DiffSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document identifier.
pub type DocId = String;

/// Peer identifier carried by shadows and messages.
pub type ClientId = String;

/// `clientVersion` value that marks a [seeded edit](Edit::is_seeded).
pub const SEEDED_CLIENT_VERSION: i64 = -1;

/// The authoritative current value of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier
    pub id: DocId,
    /// Opaque content, only ever handed to the diff primitive
    pub content: Value,
}

impl Document {
    /// Create a document from an id and its content.
    pub fn new(id: impl Into<DocId>, content: Value) -> Self {
        Self {
            id: id.into(),
            content,
        }
    }
}

/// The last state both peers are known to agree on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    /// Document identifier
    pub id: DocId,
    /// Peer that owns this shadow
    pub client_id: ClientId,
    /// Number of local edits sent against this shadow
    pub client_version: u64,
    /// Number of remote edits applied to this shadow
    pub server_version: u64,
    /// Content as of the last agreed state
    pub content: Value,
}

impl Shadow {
    /// Fresh shadow at versions 0/0.
    pub fn new(id: impl Into<DocId>, client_id: impl Into<ClientId>, content: Value) -> Self {
        Self {
            id: id.into(),
            client_id: client_id.into(),
            client_version: 0,
            server_version: 0,
            content,
        }
    }
}

/// Single rollback snapshot of a shadow, keyed by its `clientVersion` at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// Document identifier
    pub id: DocId,
    /// Shadow's `clientVersion` when the snapshot was taken
    pub client_version: u64,
    /// Shadow content at snapshot time
    pub content: Value,
}

impl Backup {
    /// Snapshot the content and client version of a shadow.
    pub fn from_shadow(shadow: &Shadow) -> Self {
        Self {
            id: shadow.id.clone(),
            client_version: shadow.client_version,
            content: shadow.content.clone(),
        }
    }
}

/// One diff set plus the version pair it was computed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    /// Sender's client version, or `-1` for a seeded edit
    pub client_version: i64,
    /// Receiver-side version the edit was computed against
    pub server_version: u64,
    /// Carried for wire compatibility; never computed or verified
    #[serde(default)]
    pub checksum: String,
    /// Operations that turn the shadow into the sender's new content
    pub diffs: DiffSet,
}

impl Edit {
    /// Build an edit against a shadow's current versions.
    pub fn against(shadow: &Shadow, diffs: DiffSet) -> Self {
        Self {
            client_version: shadow.client_version as i64,
            server_version: shadow.server_version,
            checksum: String::new(),
            diffs,
        }
    }

    /// Build a seeded edit that bypasses version checks on the receiver.
    pub fn seeded(server_version: u64, diffs: DiffSet) -> Self {
        Self {
            client_version: SEEDED_CLIENT_VERSION,
            server_version,
            checksum: String::new(),
            diffs,
        }
    }

    /// Whether this is a bootstrap edit (`clientVersion == -1`).
    #[inline]
    pub fn is_seeded(&self) -> bool {
        self.client_version == SEEDED_CLIENT_VERSION
    }

    /// The client version as an unsigned counter, `None` for negative values.
    #[inline]
    pub fn client_version(&self) -> Option<u64> {
        u64::try_from(self.client_version).ok()
    }
}

/// Discriminator of wire messages. Only `"patch"` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    /// A batch of edits for one document
    #[serde(rename = "patch")]
    Patch,
}

/// The ordered batch of edits exchanged between peers for one document.
///
/// `edits` runs oldest pending first, newest last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchMessage {
    /// Always [`MessageType::Patch`]
    pub msg_type: MessageType,
    /// Document the edits apply to
    pub id: DocId,
    /// Sender's client id
    pub client_id: ClientId,
    /// Edits in send order
    pub edits: Vec<Edit>,
}

impl PatchMessage {
    /// Create a patch message for a document.
    pub fn new(id: impl Into<DocId>, client_id: impl Into<ClientId>, edits: Vec<Edit>) -> Self {
        Self {
            msg_type: MessageType::Patch,
            id: id.into(),
            client_id: client_id.into(),
            edits,
        }
    }

    /// Whether the message carries no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// Locally generated edits awaiting confirmation from the peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEdits {
    /// Document identifier
    pub id: DocId,
    /// Local client id the edits were sent as
    pub client_id: ClientId,
    /// Unacknowledged edits, oldest first
    pub edits: Vec<Edit>,
}

impl PendingEdits {
    /// Empty queue entry for a document.
    pub fn new(id: impl Into<DocId>, client_id: impl Into<ClientId>) -> Self {
        Self {
            id: id.into(),
            client_id: client_id.into(),
            edits: Vec::new(),
        }
    }

    /// Cumulative acknowledgment: drop every edit with `clientVersion <= up_to`.
    ///
    /// Returns how many edits were removed.
    pub fn acknowledge(&mut self, up_to: i64) -> usize {
        let before = self.edits.len();
        self.edits.retain(|edit| edit.client_version > up_to);
        before - self.edits.len()
    }

    /// Number of queued edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}
