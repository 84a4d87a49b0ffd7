//! Pending-edit queue: local edits not yet confirmed by the peer.
//!
//! Acknowledgment is cumulative, Go-Back-N style. Acknowledging an edit drops it and
//! every older queued edit, so a single confirmation can clear a run of sends.

use super::Table;
use crate::types::{Edit, PendingEdits};

/// Per-document queue of unacknowledged [`Edit`]s, oldest first.
#[derive(Debug, Clone)]
pub struct PendingQueue {
    queues: Table<PendingEdits>,
}

impl PendingQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self {
            queues: Table::new(),
        }
    }

    /// Copy of the queue entry for `id`.
    pub fn get(&self, id: &str) -> Option<PendingEdits> {
        self.queues.get(id)
    }

    /// Queued edits for `id`, oldest first. Empty if nothing is queued.
    pub fn edits(&self, id: &str) -> Vec<Edit> {
        self.queues
            .get(id)
            .map(|pending| pending.edits)
            .unwrap_or_default()
    }

    /// Append an edit to the back of the queue, creating the entry if needed.
    pub fn push(&self, id: &str, client_id: &str, edit: Edit) {
        if self.queues.update(id, |pending| pending.edits.push(edit.clone())).is_none() {
            let mut pending = PendingEdits::new(id, client_id);
            pending.edits.push(edit);
            self.queues.insert(id.to_string(), pending);
        }
    }

    /// Drop every queued edit with `clientVersion <= up_to`.
    ///
    /// Returns the number of edits removed.
    pub fn acknowledge(&self, id: &str, up_to: i64) -> usize {
        self.queues
            .update(id, |pending| pending.acknowledge(up_to))
            .unwrap_or(0)
    }

    /// Discard every queued edit for `id`. Returns how many were dropped.
    pub fn clear(&self, id: &str) -> usize {
        self.queues
            .update(id, |pending| std::mem::take(&mut pending.edits).len())
            .unwrap_or(0)
    }

    /// Replace the entry for `id` with an empty queue.
    pub fn reset(&self, id: &str, client_id: &str) {
        self.queues
            .insert(id.to_string(), PendingEdits::new(id, client_id));
    }

    /// Number of queued edits for `id`.
    pub fn len(&self, id: &str) -> usize {
        self.queues.get(id).map_or(0, |pending| pending.len())
    }

    /// Whether nothing is queued for `id`.
    pub fn is_empty(&self, id: &str) -> bool {
        self.len(id) == 0
    }
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffSet;

    fn edit(client_version: i64) -> Edit {
        Edit {
            client_version,
            server_version: 0,
            checksum: String::new(),
            diffs: DiffSet::default(),
        }
    }

    #[test]
    fn test_push_creates_entry() {
        let queue = PendingQueue::new();
        assert!(queue.is_empty("d1"));

        queue.push("d1", "alice", edit(0));
        queue.push("d1", "alice", edit(1));

        let pending = queue.get("d1").unwrap();
        assert_eq!(pending.client_id, "alice");
        assert_eq!(queue.len("d1"), 2);
    }

    #[test]
    fn test_acknowledge_removes_older_edits() {
        let queue = PendingQueue::new();
        for v in 0..5 {
            queue.push("d1", "alice", edit(v));
        }

        assert_eq!(queue.acknowledge("d1", 2), 3);
        let left: Vec<i64> = queue.edits("d1").iter().map(|e| e.client_version).collect();
        assert_eq!(left, vec![3, 4]);
    }

    #[test]
    fn test_acknowledge_unknown_document() {
        let queue = PendingQueue::new();
        assert_eq!(queue.acknowledge("missing", 10), 0);
        assert!(queue.edits("missing").is_empty());
    }

    #[test]
    fn test_clear_and_reset() {
        let queue = PendingQueue::new();
        queue.push("d1", "alice", edit(0));
        queue.push("d1", "alice", edit(1));
        assert_eq!(queue.clear("d1"), 2);
        assert!(queue.is_empty("d1"));

        queue.push("d1", "alice", edit(2));
        queue.reset("d1", "bob");
        assert!(queue.is_empty("d1"));
        assert_eq!(queue.get("d1").unwrap().client_id, "bob");
    }
}
