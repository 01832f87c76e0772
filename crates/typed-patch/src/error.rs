//! Failure taxonomy for path resolution, coercion and operation execution.

use thiserror::Error;
use typed_patch_pointer::PointerError;

use crate::document::OpKind;

// ── Error kinds ───────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("MALFORMED_PATH")]
    MalformedPath,
    #[error("UNKNOWN_MEMBER")]
    UnknownMember,
    #[error("READ_ONLY_MEMBER")]
    ReadOnlyMember,
    #[error("MEMBER_EXCLUDED")]
    MemberExcluded,
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("INDEX_OUT_OF_RANGE")]
    IndexOutOfRange,
    #[error("PATH_DOES_NOT_TERMINATE_IN_VALUE")]
    PathDoesNotTerminateInValue,
    #[error("TYPE_MISMATCH: {0}")]
    TypeMismatch(String),
    #[error("TEST_FAILED")]
    TestFailed,
    #[error("INVALID_MOVE")]
    InvalidMove,
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

impl PatchError {
    pub(crate) fn mismatch(expected: &str, found: &serde_json::Value) -> Self {
        PatchError::TypeMismatch(format!("expected {expected}, found {}", kind_of(found)))
    }
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Located faults ────────────────────────────────────────────────────────

/// An error kind plus the segment it was detected at. `None` means the whole
/// path (the root, or a failure not tied to one segment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fault {
    pub error: PatchError,
    pub segment: Option<usize>,
    /// Detected while resolving the `from` path of a move or copy.
    pub from: bool,
}

impl Fault {
    pub fn at(segment: usize, error: PatchError) -> Self {
        Self { error, segment: Some(segment), from: false }
    }

    pub fn whole(error: PatchError) -> Self {
        Self { error, segment: None, from: false }
    }

    /// A failure at the final segment of `path` (the root for an empty path).
    pub fn last(path: &[String], error: PatchError) -> Self {
        Self { error, segment: path.len().checked_sub(1), from: false }
    }

    pub fn source(mut self) -> Self {
        self.from = true;
        self
    }
}

impl From<PointerError> for Fault {
    fn from(err: PointerError) -> Self {
        Self { segment: err.segment(), error: PatchError::MalformedPath, from: false }
    }
}

// ── Failure ───────────────────────────────────────────────────────────────

/// The first failure of a patch document.
///
/// Operations before `index` stay applied: documents are not transactional.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{op} operation #{index} failed at {path:?}: {error}")]
pub struct Failure {
    /// Position of the failing operation in the document.
    pub index: usize,
    pub op: OpKind,
    /// The path string being resolved when the failure was detected
    /// (`from` for the source half of move/copy).
    pub path: String,
    /// Index of the segment the failure was detected at, if any.
    pub segment: Option<usize>,
    pub error: PatchError,
}

impl Failure {
    pub(crate) fn new(index: usize, op: OpKind, path: &str, fault: Fault) -> Self {
        Self {
            index,
            op,
            path: path.to_string(),
            segment: fault.segment,
            error: fault.error,
        }
    }
}
