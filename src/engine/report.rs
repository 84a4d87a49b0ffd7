//! Per-edit results of processing a patch message.

use crate::types::DocId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the shadow state machine did with one incoming edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditOutcome {
    /// The shadow was stale; it was rebuilt from the backup with this edit applied.
    Restored,
    /// The edit was already seen; only the pending queue was pruned.
    Discarded,
    /// The edit matched the shadow's versions (or was seeded) and was applied.
    Applied,
    /// No state matched. The edit was left unapplied and reported.
    Skipped,
}

/// Summary of a [`patch`](super::SyncEngine::patch) call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchReport {
    /// Document the message targeted
    pub id: DocId,
    /// One entry per incoming edit, in message order
    pub outcomes: Vec<EditOutcome>,
    /// Document content after the patch
    pub content: Value,
}

impl PatchReport {
    /// Number of edits with the given outcome.
    pub fn count(&self, outcome: EditOutcome) -> usize {
        self.outcomes.iter().filter(|o| **o == outcome).count()
    }

    /// Number of edits no state matched.
    pub fn skipped(&self) -> usize {
        self.count(EditOutcome::Skipped)
    }

    /// Whether every edit was handled by a known state.
    pub fn is_clean(&self) -> bool {
        self.skipped() == 0
    }
}
