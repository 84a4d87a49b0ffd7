//! JSON Patch differ: structural diffs over `serde_json::Value`.
//!
//! Paths are JSON Pointers (RFC 6901). The differ walks both values together:
//!
//! - objects are compared key by key
//! - arrays of equal length are compared element by element
//! - other arrays are trimmed of their common prefix and suffix, then the middle is
//!   paired up, with the surplus removed or added
//! - anything else that differs becomes a `replace`
//!
//! Application never fails because a target went missing. An operation whose parent
//! no longer exists on the base is skipped with a warning; the rest of the set still
//! applies.

use super::{DiffSet, Differ};
use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// A single JSON Patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    /// Insert into an array or set an object member
    Add {
        /// Target location
        path: String,
        /// Value to insert
        value: Value,
    },
    /// Remove an array element or object member
    Remove {
        /// Target location
        path: String,
    },
    /// Overwrite the value at `path`
    Replace {
        /// Target location
        path: String,
        /// New value
        value: Value,
    },
}

impl PatchOp {
    /// The JSON Pointer this operation targets.
    pub fn path(&self) -> &str {
        match self {
            PatchOp::Add { path, .. } | PatchOp::Remove { path } | PatchOp::Replace { path, .. } => {
                path
            }
        }
    }

    fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| SyncError::Patch(format!("Invalid patch operation {}: {}", value, e)))
    }
}

/// Default [`Differ`] producing JSON Patch operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPatchDiffer;

impl JsonPatchDiffer {
    /// Create the differ. It holds no state.
    pub fn new() -> Self {
        Self
    }
}

impl Differ for JsonPatchDiffer {
    fn diff(&self, a: &Value, b: &Value) -> Result<DiffSet> {
        let mut ops = Vec::new();
        diff_at(&mut ops, &mut Vec::new(), a, b);
        ops.iter()
            .map(PatchOp::to_value)
            .collect::<Result<Vec<_>>>()
            .map(DiffSet::new)
    }

    fn apply(&self, base: &Value, diffs: &DiffSet) -> Result<Value> {
        let mut doc = base.clone();
        for raw in diffs {
            let op = PatchOp::from_value(raw)?;
            if !apply_op(&mut doc, &op)? {
                warn!(path = op.path(), "Skipping patch operation: target no longer exists");
            }
        }
        Ok(doc)
    }
}

// ========== Diff ==========

fn diff_at(ops: &mut Vec<PatchOp>, path: &mut Vec<String>, src: &Value, dst: &Value) {
    if src == dst {
        return;
    }
    match (src, dst) {
        (Value::Object(s), Value::Object(d)) => diff_object(ops, path, s, d),
        (Value::Array(s), Value::Array(d)) => diff_array(ops, path, s, d),
        _ => ops.push(PatchOp::Replace {
            path: format_pointer(path),
            value: dst.clone(),
        }),
    }
}

fn diff_object(
    ops: &mut Vec<PatchOp>,
    path: &mut Vec<String>,
    src: &Map<String, Value>,
    dst: &Map<String, Value>,
) {
    for key in src.keys().filter(|key| !dst.contains_key(*key)) {
        path.push(key.clone());
        ops.push(PatchOp::Remove {
            path: format_pointer(path),
        });
        path.pop();
    }

    for (key, dst_val) in dst {
        path.push(key.clone());
        match src.get(key) {
            Some(src_val) => diff_at(ops, path, src_val, dst_val),
            None => ops.push(PatchOp::Add {
                path: format_pointer(path),
                value: dst_val.clone(),
            }),
        }
        path.pop();
    }
}

fn diff_array(ops: &mut Vec<PatchOp>, path: &mut Vec<String>, src: &[Value], dst: &[Value]) {
    if src.len() == dst.len() {
        for (i, (s, d)) in src.iter().zip(dst).enumerate() {
            path.push(i.to_string());
            diff_at(ops, path, s, d);
            path.pop();
        }
        return;
    }

    let prefix = src.iter().zip(dst).take_while(|(s, d)| s == d).count();
    let max_suffix = src.len().min(dst.len()) - prefix;
    let suffix = src
        .iter()
        .rev()
        .zip(dst.iter().rev())
        .take(max_suffix)
        .take_while(|(s, d)| s == d)
        .count();

    let src_mid = &src[prefix..src.len() - suffix];
    let dst_mid = &dst[prefix..dst.len() - suffix];
    let paired = src_mid.len().min(dst_mid.len());

    for i in 0..paired {
        path.push((prefix + i).to_string());
        diff_at(ops, path, &src_mid[i], &dst_mid[i]);
        path.pop();
    }

    // Surplus removals run from the back so earlier indices stay valid.
    for i in (paired..src_mid.len()).rev() {
        path.push((prefix + i).to_string());
        ops.push(PatchOp::Remove {
            path: format_pointer(path),
        });
        path.pop();
    }

    for (i, value) in dst_mid.iter().enumerate().skip(paired) {
        path.push((prefix + i).to_string());
        ops.push(PatchOp::Add {
            path: format_pointer(path),
            value: value.clone(),
        });
        path.pop();
    }
}

// ========== Apply ==========

/// Apply one operation in place. Returns `false` when the target could not be reached.
fn apply_op(doc: &mut Value, op: &PatchOp) -> Result<bool> {
    let tokens = parse_pointer(op.path())?;

    let Some((last, parent_tokens)) = tokens.split_last() else {
        *doc = match op {
            PatchOp::Add { value, .. } | PatchOp::Replace { value, .. } => value.clone(),
            PatchOp::Remove { .. } => Value::Null,
        };
        return Ok(true);
    };

    let Some(parent) = resolve_mut(doc, parent_tokens) else {
        return Ok(false);
    };

    let applied = match parent {
        Value::Object(map) => match op {
            PatchOp::Add { value, .. } | PatchOp::Replace { value, .. } => {
                map.insert(last.clone(), value.clone());
                true
            }
            PatchOp::Remove { .. } => map.remove(last).is_some(),
        },
        Value::Array(items) => apply_array_op(items, last, op),
        _ => false,
    };

    Ok(applied)
}

fn apply_array_op(items: &mut Vec<Value>, token: &str, op: &PatchOp) -> bool {
    let index = if token == "-" {
        Some(items.len())
    } else {
        token.parse::<usize>().ok()
    };
    let Some(index) = index else {
        return false;
    };

    match op {
        PatchOp::Add { value, .. } => {
            items.insert(index.min(items.len()), value.clone());
            true
        }
        PatchOp::Remove { .. } if index < items.len() => {
            items.remove(index);
            true
        }
        PatchOp::Replace { value, .. } if index < items.len() => {
            items[index] = value.clone();
            true
        }
        _ => false,
    }
}

fn resolve_mut<'a>(doc: &'a mut Value, tokens: &[String]) -> Option<&'a mut Value> {
    tokens.iter().try_fold(doc, |current, token| match current {
        Value::Object(map) => map.get_mut(token),
        Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
        _ => None,
    })
}

// ========== JSON Pointer ==========

/// Format path tokens as a JSON Pointer (`~` → `~0`, `/` → `~1`).
pub fn format_pointer(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|token| format!("/{}", token.replace('~', "~0").replace('/', "~1")))
        .collect()
}

/// Parse a JSON Pointer into unescaped tokens.
///
/// # Errors
///
/// Returns [`SyncError::Patch`] if a non-empty pointer does not start with `/`.
pub fn parse_pointer(pointer: &str) -> Result<Vec<String>> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let rest = pointer
        .strip_prefix('/')
        .ok_or_else(|| SyncError::Patch(format!("Invalid JSON pointer: '{}'", pointer)))?;

    Ok(rest
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect())
}
