//! Last mutually acknowledged baseline per document.

use super::Table;
use crate::types::Shadow;

/// Holds exactly one [`Shadow`] per document id.
///
/// Shadows are not partitioned by client id, so only one peer relationship per
/// document is supported at a time.
#[derive(Debug, Clone)]
pub struct ShadowStore {
    shadows: Table<Shadow>,
}

impl ShadowStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            shadows: Table::new(),
        }
    }

    /// Copy of the shadow for `id`.
    pub fn get(&self, id: &str) -> Option<Shadow> {
        self.shadows.get(id)
    }

    /// Store a shadow, replacing the previous one for its id.
    pub fn put(&self, shadow: Shadow) {
        self.shadows.insert(shadow.id.clone(), shadow);
    }

    /// Whether a shadow exists for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.shadows.contains(id)
    }
}

impl Default for ShadowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_shadow_per_id() {
        let store = ShadowStore::new();
        store.put(Shadow::new("d1", "alice", json!(1)));
        store.put(Shadow::new("d1", "bob", json!(2)));

        let shadow = store.get("d1").unwrap();
        assert_eq!(shadow.client_id, "bob");
        assert_eq!(shadow.content, json!(2));
    }
}
