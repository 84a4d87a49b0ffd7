//! Authoritative current value of each document.

use super::Table;
use crate::types::{DocId, Document};
use serde_json::Value;

/// Holds the current [`Document`] for every id.
///
/// Documents are created by `add_document`, rewritten by `patch_document` and never
/// deleted here.
#[derive(Debug, Clone)]
pub struct ContentStore {
    documents: Table<Document>,
}

impl ContentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            documents: Table::new(),
        }
    }

    /// Copy of the document stored under `id`.
    pub fn get(&self, id: &str) -> Option<Document> {
        self.documents.get(id)
    }

    /// Store a document, replacing any previous value for its id.
    pub fn put(&self, document: Document) {
        self.documents.insert(document.id.clone(), document);
    }

    /// Overwrite the content of an existing document.
    ///
    /// Returns `false` if no document is stored under `id`.
    pub fn set_content(&self, id: &str, content: Value) -> bool {
        self.documents
            .update(id, |document| document.content = content)
            .is_some()
    }

    /// Whether a document is stored under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains(id)
    }

    /// Ids of all stored documents, in arbitrary order.
    pub fn ids(&self) -> Vec<DocId> {
        self.documents.ids()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no document is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_and_get() {
        let store = ContentStore::new();
        store.put(Document::new("d1", json!({"text": "Hello"})));
        assert_eq!(store.get("d1").unwrap().content, json!({"text": "Hello"}));
        assert!(store.get("d2").is_none());
    }

    #[test]
    fn test_set_content() {
        let store = ContentStore::new();
        assert!(!store.set_content("d1", json!(1)));

        store.put(Document::new("d1", json!(0)));
        assert!(store.set_content("d1", json!(1)));
        assert_eq!(store.get("d1").unwrap().content, json!(1));
    }

    #[test]
    fn test_put_overwrites() {
        let store = ContentStore::new();
        store.put(Document::new("d1", json!("a")));
        store.put(Document::new("d1", json!("b")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("d1").unwrap().content, json!("b"));
    }
}
