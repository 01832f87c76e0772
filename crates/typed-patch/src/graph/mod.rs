//! The object graph a patch is applied to.
//!
//! Every slot type implements [`Node`], which reports the slot's shape through
//! [`NodeRef`] / [`NodeMut`]: a named-member [`Record`], an ordered
//! [`Sequence`], a string-keyed [`Dictionary`], or a scalar leaf. Traversal
//! dispatches on that tag at every level, so a path such as
//! `DownDocs/0/Integers/0` descends through a sequence, a record and another
//! sequence down to a scalar without any runtime type inspection.
//!
//! [`Graph`] adds the operations that need the slot's static type (coercing
//! writes, write checks and typed comparison) and is implemented for every
//! [`Coerce`] type.

use serde_json::Value;

use crate::coerce::{Coerce, Coercion};
use crate::error::PatchError;

mod impls;
mod record;

/// Shape and snapshot access for one slot type.
pub trait Node {
    fn node(&self) -> NodeRef<'_>;
    fn node_mut(&mut self) -> NodeMut<'_>;
    /// Snapshot of the current content in the input representation.
    fn to_value(&self) -> Value;
}

/// Object-safe view of a slot: shape plus typed writes.
pub trait Graph: Node {
    /// Coerce `value` into this slot's type and overwrite the slot with it.
    fn assign(&mut self, value: &Value, coercion: &Coercion) -> Result<(), PatchError>;

    /// Check that `value` coerces into this slot's type without writing it.
    fn accepts(&self, value: &Value, coercion: &Coercion) -> Result<(), PatchError>;

    /// Coerce `value` into this slot's type and compare it with the current
    /// content.
    fn matches(&self, value: &Value, coercion: &Coercion) -> Result<bool, PatchError>;
}

impl<T: Coerce> Graph for T {
    fn assign(&mut self, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
        self.coerce_in_place(value, coercion)
    }

    fn accepts(&self, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
        T::coerce(value, coercion).map(drop)
    }

    fn matches(&self, value: &Value, coercion: &Coercion) -> Result<bool, PatchError> {
        self.coerced_eq(value, coercion)
    }
}

pub enum NodeRef<'a> {
    Record(&'a dyn Record),
    Sequence(&'a dyn Sequence),
    Map(&'a dyn Dictionary),
    Leaf,
}

pub enum NodeMut<'a> {
    Record(&'a mut dyn Record),
    Sequence(&'a mut dyn Sequence),
    Map(&'a mut dyn Dictionary),
    Leaf,
}

impl NodeRef<'_> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf)
    }
}

/// A declared member of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    pub name: &'static str,
    pub writable: bool,
}

impl Member {
    pub const fn writable(name: &'static str) -> Self {
        Self { name, writable: true }
    }

    pub const fn read_only(name: &'static str) -> Self {
        Self { name, writable: false }
    }
}

/// A container of named members, usually implemented with [`crate::record!`].
pub trait Record {
    fn type_name(&self) -> &'static str;

    fn members(&self) -> &'static [Member];

    fn member(&self, name: &str) -> Option<&dyn Graph>;

    /// Mutable access, also for read-only members so paths can descend
    /// through them. Writes to read-only members are refused by the resolver.
    fn member_mut(&mut self, name: &str) -> Option<&mut dyn Graph>;

    /// Reset a writable member to the record's default. Returns `false` for
    /// unknown or read-only members.
    fn reset_member(&mut self, name: &str) -> bool;

    fn declared(&self, name: &str) -> Option<Member> {
        self.members().iter().find(|m| m.name == name).copied()
    }
}

/// An ordered, 0-based, index-addressable sequence.
pub trait Sequence {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn element(&self, index: usize) -> Option<&dyn Graph>;

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Graph>;

    /// Coerce `value` and insert it at `index` (`index <= len`), shifting
    /// subsequent elements.
    fn insert(&mut self, index: usize, value: &Value, coercion: &Coercion)
        -> Result<(), PatchError>;

    /// Check that `value` coerces into the element type.
    fn admits(&self, value: &Value, coercion: &Coercion) -> Result<(), PatchError>;

    /// Remove the element at `index`, returning its snapshot.
    fn remove(&mut self, index: usize) -> Option<Value>;
}

/// A string-keyed map.
pub trait Dictionary {
    fn entry(&self, key: &str) -> Option<&dyn Graph>;

    fn entry_mut(&mut self, key: &str) -> Option<&mut dyn Graph>;

    /// Coerce `value` and store it under `key`, creating the key if absent.
    fn insert(&mut self, key: &str, value: &Value, coercion: &Coercion) -> Result<(), PatchError>;

    /// Check that `value` coerces into the value type.
    fn admits(&self, value: &Value, coercion: &Coercion) -> Result<(), PatchError>;

    /// Remove `key`, returning the snapshot of its value.
    fn remove(&mut self, key: &str) -> Option<Value>;
}
