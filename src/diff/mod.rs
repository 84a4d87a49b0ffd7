//! The diff/patch capability the engine is built on.
//!
//! The engine never looks inside document content or diffs. It only hands them to a
//! [`Differ`], which must provide two pure operations:
//!
//! | Operation | Contract |
//! |-----------|----------|
//! | [`Differ::diff`] | deterministic; produces a [`DiffSet`] turning `a` into `b` |
//! | [`Differ::apply`] | applies a [`DiffSet`] to a base, best-effort when the base has drifted |
//!
//! Best-effort application matters because a shadow can lag behind the value a diff
//! was computed against, so a diff may be applied to a *different but compatible* base.
//!
//! # Built-in Differ
//!
//! [`JsonPatchDiffer`] emits RFC 6902 style `add`/`remove`/`replace` operations:
//!
//! ```
//! use diffsync::diff::{Differ, JsonPatchDiffer};
//! use serde_json::json;
//!
//! let differ = JsonPatchDiffer::new();
//! let a = json!({"text": "Hello"});
//! let b = json!({"text": "Hello World"});
//!
//! let diffs = differ.diff(&a, &b).unwrap();
//! assert_eq!(differ.apply(&a, &diffs).unwrap(), b);
//! ```

pub mod json_patch;

pub use json_patch::{JsonPatchDiffer, PatchOp};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered sequence of diff operations, opaque to the engine.
///
/// Serializes as a plain JSON array so it can sit in the `diffs` field of an edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffSet(Vec<Value>);

impl DiffSet {
    /// Create a diff set from raw operations.
    pub fn new(ops: Vec<Value>) -> Self {
        Self(ops)
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set holds no operations, meaning nothing changed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the raw operations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// Consume the set, returning the raw operations.
    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for DiffSet {
    fn from(ops: Vec<Value>) -> Self {
        Self(ops)
    }
}

impl<'a> IntoIterator for &'a DiffSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Injected diff/patch primitive.
///
/// Implementations must be pure: the same inputs always give the same outputs.
pub trait Differ: Send + Sync {
    /// Compute the operations that transform `a` into `b`.
    fn diff(&self, a: &Value, b: &Value) -> Result<DiffSet>;

    /// Apply `diffs` to `base`, producing a new value.
    fn apply(&self, base: &Value, diffs: &DiffSet) -> Result<Value>;
}

impl<D: Differ + ?Sized> Differ for std::sync::Arc<D> {
    fn diff(&self, a: &Value, b: &Value) -> Result<DiffSet> {
        (**self).diff(a, b)
    }

    fn apply(&self, base: &Value, diffs: &DiffSet) -> Result<Value> {
        (**self).apply(base, diffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_diff_set_serializes_as_array() {
        let set = DiffSet::new(vec![json!({"op": "remove", "path": "/a"})]);
        let encoded = serde_json::to_string(&set).unwrap();
        assert_eq!(encoded, r#"[{"op":"remove","path":"/a"}]"#);

        let decoded: DiffSet = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, set);
    }

    #[test]
    fn test_diff_set_default_is_empty() {
        let set = DiffSet::default();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_arc_differ() {
        let differ = std::sync::Arc::new(JsonPatchDiffer::new());
        let diffs = differ.diff(&json!(1), &json!(2)).unwrap();
        assert_eq!(differ.apply(&json!(1), &diffs).unwrap(), json!(2));
    }
}
