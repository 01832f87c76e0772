//! Patch documents: ordered lists of operations and the functions that apply
//! them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::apply::apply_operation;
use crate::error::{Failure, PatchError};
use crate::graph::{Graph, Node};
use crate::options::ApplyOptions;
use crate::resolve::locate;

// ── Operation ─────────────────────────────────────────────────────────────

/// A single patch operation. Paths are kept as raw strings and parsed when
/// the operation is applied, according to [`ApplyOptions::paths`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Remove => "remove",
            OpKind::Replace => "replace",
            OpKind::Move => "move",
            OpKind::Copy => "copy",
            OpKind::Test => "test",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Operation {
    pub fn add(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Operation::Add { path: path.into(), value: value.into() }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Operation::Remove { path: path.into() }
    }

    pub fn replace(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Operation::Replace { path: path.into(), value: value.into() }
    }

    pub fn move_(from: impl Into<String>, path: impl Into<String>) -> Self {
        Operation::Move { from: from.into(), path: path.into() }
    }

    pub fn copy(from: impl Into<String>, path: impl Into<String>) -> Self {
        Operation::Copy { from: from.into(), path: path.into() }
    }

    pub fn test(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Operation::Test { path: path.into(), value: value.into() }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Add { .. } => OpKind::Add,
            Operation::Remove { .. } => OpKind::Remove,
            Operation::Replace { .. } => OpKind::Replace,
            Operation::Move { .. } => OpKind::Move,
            Operation::Copy { .. } => OpKind::Copy,
            Operation::Test { .. } => OpKind::Test,
        }
    }

    /// The target path.
    pub fn path(&self) -> &str {
        match self {
            Operation::Add { path, .. }
            | Operation::Remove { path }
            | Operation::Replace { path, .. }
            | Operation::Move { path, .. }
            | Operation::Copy { path, .. }
            | Operation::Test { path, .. } => path,
        }
    }

    /// The source path of `move` and `copy`.
    pub fn from_path(&self) -> Option<&str> {
        match self {
            Operation::Move { from, .. } | Operation::Copy { from, .. } => Some(from),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Operation::Add { value, .. }
            | Operation::Replace { value, .. }
            | Operation::Test { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut out = json!({ "op": self.kind().as_str() });
        if let Some(from) = self.from_path() {
            out["from"] = json!(from);
        }
        out["path"] = json!(self.path());
        if let Some(value) = self.value() {
            out["value"] = value.clone();
        }
        out
    }
}

// ── PatchDocument ─────────────────────────────────────────────────────────

/// An ordered list of operations, applied strictly left to right.
///
/// Application stops at the first failing operation. Operations applied
/// before it are not rolled back; use [`apply_atomic`] when the whole
/// document must succeed or leave the target untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument {
    operations: Vec<Operation>,
}

impl PatchDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn add(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(Operation::add(path, value));
        self
    }

    pub fn remove(mut self, path: impl Into<String>) -> Self {
        self.push(Operation::remove(path));
        self
    }

    pub fn replace(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(Operation::replace(path, value));
        self
    }

    pub fn move_(mut self, from: impl Into<String>, path: impl Into<String>) -> Self {
        self.push(Operation::move_(from, path));
        self
    }

    pub fn copy(mut self, from: impl Into<String>, path: impl Into<String>) -> Self {
        self.push(Operation::copy(from, path));
        self
    }

    pub fn test(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(Operation::test(path, value));
        self
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Decodes a document from its JSON array form.
    ///
    /// # Errors
    ///
    /// [`PatchError::InvalidOp`] naming the first record that cannot be
    /// decoded.
    pub fn from_json(value: &Value) -> Result<Self, PatchError> {
        let records = value
            .as_array()
            .ok_or_else(|| PatchError::InvalidOp("patch document must be an array".to_string()))?;
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                Operation::deserialize(record)
                    .map_err(|e| PatchError::InvalidOp(format!("operation #{index}: {e}")))
            })
            .collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.operations.iter().map(Operation::to_json).collect())
    }

    /// Applies the document with default options.
    pub fn apply_to(&self, root: &mut dyn Graph) -> Result<(), Failure> {
        apply(self, root)
    }

    pub fn apply_to_with(&self, root: &mut dyn Graph, options: &ApplyOptions) -> Result<(), Failure> {
        apply_with(self, root, options)
    }
}

impl FromIterator<Operation> for PatchDocument {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self { operations: iter.into_iter().collect() }
    }
}

impl From<Vec<Operation>> for PatchDocument {
    fn from(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}

// ── Application ───────────────────────────────────────────────────────────

pub fn apply(document: &PatchDocument, root: &mut dyn Graph) -> Result<(), Failure> {
    apply_with(document, root, &ApplyOptions::default())
}

/// Applies every operation of `document` to `root` in order.
///
/// # Errors
///
/// The first failing operation aborts the document. Earlier operations
/// remain applied.
pub fn apply_with(
    document: &PatchDocument,
    root: &mut dyn Graph,
    options: &ApplyOptions,
) -> Result<(), Failure> {
    for (index, operation) in document.operations().iter().enumerate() {
        tracing::debug!(op = %operation.kind(), index, path = operation.path(), "applying operation");
        if let Err(fault) = apply_operation(root, operation, options) {
            let path = if fault.from {
                operation.from_path().unwrap_or_default()
            } else {
                operation.path()
            };
            let failure = Failure::new(index, operation.kind(), path, fault);
            tracing::debug!(index, error = %failure.error, "patch aborted");
            return Err(failure);
        }
    }
    Ok(())
}

/// Applies `document` to a clone of `root` and keeps the result only if every
/// operation succeeds.
pub fn apply_atomic<T: Graph + Clone>(
    document: &PatchDocument,
    root: &mut T,
    options: &ApplyOptions,
) -> Result<(), Failure> {
    let mut staged = root.clone();
    apply_with(document, &mut staged, options)?;
    *root = staged;
    Ok(())
}

/// Reads the value at `path` (relaxed syntax) as a JSON snapshot.
pub fn get(root: &dyn Graph, path: &str) -> Result<Value, PatchError> {
    let path = ApplyOptions::default()
        .paths
        .parse(path)
        .map_err(|_| PatchError::MalformedPath)?;
    locate(root, &path)
        .map(|node| node.to_value())
        .map_err(|fault| fault.error)
}
