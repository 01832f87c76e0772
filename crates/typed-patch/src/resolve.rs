//! Segment resolution: from a parsed path to the slot an operation touches.
//!
//! Resolution dispatches on the shape of the current node at every level and
//! descends until the parent of the final segment. Slots borrow the graph
//! mutably and live for one operation only.

use serde_json::Value;
use typed_patch_pointer::{is_valid_index, APPEND_MARKER};

use crate::coerce::Coercion;
use crate::error::{Fault, PatchError};
use crate::graph::{Dictionary, Graph, Node, NodeMut, NodeRef, Record, Sequence};
use crate::options::ApplyOptions;

/// How the final segment of a write is going to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Write {
    /// The slot may not exist yet: a new map key, an insertion point or `-`.
    Add,
    Replace,
    Remove,
}

pub(crate) enum Slot<'a> {
    Root(&'a mut dyn Graph),
    Member { record: &'a mut dyn Record, name: &'static str },
    Element { sequence: &'a mut dyn Sequence, index: usize },
    Entry { map: &'a mut dyn Dictionary, key: String },
}

/// Position of `segment` inside a sequence of length `len`.
///
/// `insert` allows `index == len` and the append marker.
fn element_index(len: usize, segment: &str, insert: bool) -> Result<usize, PatchError> {
    if segment == APPEND_MARKER {
        return if insert { Ok(len) } else { Err(PatchError::IndexOutOfRange) };
    }
    if !is_valid_index(segment) {
        return Err(PatchError::InvalidIndex);
    }
    // Only digits remain, so parsing fails on overflow alone.
    let index: usize = segment.parse().map_err(|_| PatchError::IndexOutOfRange)?;
    let in_range = if insert { index <= len } else { index < len };
    if in_range {
        Ok(index)
    } else {
        Err(PatchError::IndexOutOfRange)
    }
}

/// Mutable step into a non-final segment; the child must be a container.
fn descend<'a>(node: &'a mut dyn Graph, segment: &str, at: usize) -> Result<&'a mut dyn Graph, Fault> {
    let child = match node.node_mut() {
        NodeMut::Record(record) => record.member_mut(segment),
        NodeMut::Sequence(sequence) => {
            let index = element_index(sequence.len(), segment, false).map_err(|e| Fault::at(at, e))?;
            sequence.element_mut(index)
        }
        NodeMut::Map(map) => map.entry_mut(segment),
        NodeMut::Leaf => return Err(Fault::at(at, PatchError::PathDoesNotTerminateInValue)),
    }
    .ok_or(Fault::at(at, PatchError::UnknownMember))?;
    if child.node().is_leaf() {
        return Err(Fault::at(at, PatchError::PathDoesNotTerminateInValue));
    }
    Ok(child)
}

/// Resolves `path` for a write.
pub(crate) fn resolve<'a>(
    root: &'a mut dyn Graph,
    path: &[String],
    write: Write,
    options: &ApplyOptions,
) -> Result<Slot<'a>, Fault> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(Slot::Root(root));
    };
    let mut current = root;
    for (at, segment) in parents.iter().enumerate() {
        tracing::trace!(at, segment = segment.as_str(), "descending");
        current = descend(current, segment, at)?;
    }
    let at = parents.len();
    match current.node_mut() {
        NodeMut::Record(record) => {
            let member = record.declared(last).ok_or(Fault::at(at, PatchError::UnknownMember))?;
            if !member.writable {
                return Err(Fault::at(at, PatchError::ReadOnlyMember));
            }
            if !options.filter.allows(record.type_name(), parents, member.name) {
                return Err(Fault::at(at, PatchError::MemberExcluded));
            }
            Ok(Slot::Member { record, name: member.name })
        }
        NodeMut::Sequence(sequence) => {
            let index = element_index(sequence.len(), last, write == Write::Add)
                .map_err(|e| Fault::at(at, e))?;
            Ok(Slot::Element { sequence, index })
        }
        NodeMut::Map(map) => {
            if write != Write::Add && map.entry(last).is_none() {
                return Err(Fault::at(at, PatchError::UnknownMember));
            }
            Ok(Slot::Entry { map, key: last.clone() })
        }
        NodeMut::Leaf => Err(Fault::at(at, PatchError::PathDoesNotTerminateInValue)),
    }
}

/// Resolves `path` for a read; every segment must denote an existing slot.
pub(crate) fn locate<'a>(root: &'a dyn Graph, path: &[String]) -> Result<&'a dyn Graph, Fault> {
    let mut current = root;
    let last = path.len().saturating_sub(1);
    for (at, segment) in path.iter().enumerate() {
        let child = match current.node() {
            NodeRef::Record(record) => record.member(segment),
            NodeRef::Sequence(sequence) => {
                let index = element_index(sequence.len(), segment, false).map_err(|e| Fault::at(at, e))?;
                sequence.element(index)
            }
            NodeRef::Map(map) => map.entry(segment),
            NodeRef::Leaf => return Err(Fault::at(at, PatchError::PathDoesNotTerminateInValue)),
        }
        .ok_or(Fault::at(at, PatchError::UnknownMember))?;
        if at < last && child.node().is_leaf() {
            return Err(Fault::at(at, PatchError::PathDoesNotTerminateInValue));
        }
        current = child;
    }
    Ok(current)
}

impl Slot<'_> {
    /// Insert into a sequence or map; overwrite a record member or the root.
    pub fn add(self, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
        match self {
            Slot::Root(root) => root.assign(value, coercion),
            Slot::Member { record, name } => member_mut(record, name)?.assign(value, coercion),
            Slot::Element { sequence, index } => sequence.insert(index, value, coercion),
            Slot::Entry { map, key } => map.insert(&key, value, coercion),
        }
    }

    /// Check that an `add` of `value` would succeed, without writing.
    pub fn accepts(&self, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
        match self {
            Slot::Root(root) => root.accepts(value, coercion),
            Slot::Member { record, name } => record
                .member(name)
                .ok_or(PatchError::UnknownMember)?
                .accepts(value, coercion),
            Slot::Element { sequence, .. } => sequence.admits(value, coercion),
            Slot::Entry { map, .. } => map.admits(value, coercion),
        }
    }

    /// Overwrite an existing slot in place.
    pub fn replace(self, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
        match self {
            Slot::Root(root) => root.assign(value, coercion),
            Slot::Member { record, name } => member_mut(record, name)?.assign(value, coercion),
            Slot::Element { sequence, index } => sequence
                .element_mut(index)
                .ok_or(PatchError::IndexOutOfRange)?
                .assign(value, coercion),
            Slot::Entry { map, key } => map
                .entry_mut(&key)
                .ok_or(PatchError::UnknownMember)?
                .assign(value, coercion),
        }
    }

    /// Remove the slot, returning the removed content. Record members are
    /// reset to their default instead.
    pub fn remove(self) -> Result<Value, PatchError> {
        match self {
            Slot::Root(_) => Err(PatchError::ReadOnlyMember),
            Slot::Member { record, name } => {
                let old = record.member(name).ok_or(PatchError::UnknownMember)?.to_value();
                if !record.reset_member(name) {
                    return Err(PatchError::ReadOnlyMember);
                }
                Ok(old)
            }
            Slot::Element { sequence, index } => sequence.remove(index).ok_or(PatchError::IndexOutOfRange),
            Slot::Entry { map, key } => map.remove(&key).ok_or(PatchError::UnknownMember),
        }
    }
}

fn member_mut<'a>(record: &'a mut dyn Record, name: &str) -> Result<&'a mut dyn Graph, PatchError> {
    record.member_mut(name).ok_or(PatchError::UnknownMember)
}
