//! Typed patching: RFC 6902 style patch documents applied to statically-typed
//! object graphs.
//!
//! A target graph is made of records (structs exposed through [`record!`]),
//! sequences (`Vec<T>`), dictionaries (`HashMap`, `BTreeMap`, `IndexMap` and
//! JSON objects with string keys) and leaves. Operation values arrive as
//! loosely-typed [`serde_json::Value`]s and are coerced into the type of the
//! slot they are written to.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use typed_patch::{get, record, PatchDocument, PatchError};
//!
//! #[derive(Debug, Default)]
//! struct Account {
//!     name: String,
//!     limits: Vec<u32>,
//! }
//!
//! record!(Account { "Name" => name, "Limits" => limits });
//!
//! let mut account = Account::default();
//! PatchDocument::new()
//!     .replace("/Name", "ops")
//!     .add("/Limits/-", 10)
//!     .add("/Limits/0", "5")
//!     .apply_to(&mut account)
//!     .unwrap();
//! assert_eq!(get(&account, "/Limits").unwrap(), json!([5, 10]));
//!
//! let failure = PatchDocument::new()
//!     .add("/Limits/-", "many")
//!     .apply_to(&mut account)
//!     .unwrap_err();
//! assert!(matches!(failure.error, PatchError::TypeMismatch(_)));
//! ```

mod apply;
pub mod coerce;
pub mod document;
pub mod error;
pub mod filter;
pub mod graph;
pub mod options;
mod resolve;

pub use serde_json;
pub use typed_patch_pointer::Path;

pub use coerce::{Coerce, Coercion, UnknownKeys};
pub use document::{apply, apply_atomic, apply_with, get, OpKind, Operation, PatchDocument};
pub use error::{Failure, PatchError};
pub use filter::{FilterContext, MemberFilter, MemberPredicate, PredicateProvider};
pub use graph::{Dictionary, Graph, Member, Node, NodeMut, NodeRef, Record, Sequence};
pub use options::{ApplyOptions, PathSyntax};
