//! Operation executor.
//!
//! Each function applies one operation to a graph and either leaves the graph
//! in a new consistent state or returns a [`Fault`] locating the problem.

use serde_json::Value;
use typed_patch_pointer::{is_child, is_same_line, is_valid_index, parent, Path};

use crate::document::Operation;
use crate::error::{Fault, PatchError};
use crate::graph::{Graph, Node, NodeRef};
use crate::options::ApplyOptions;
use crate::resolve::{locate, resolve, Write};

// ── Single operations ─────────────────────────────────────────────────────

pub(crate) fn apply_add(
    root: &mut dyn Graph,
    path: &Path,
    value: &Value,
    options: &ApplyOptions,
) -> Result<(), Fault> {
    resolve(root, path, Write::Add, options)?
        .add(value, &options.coercion)
        .map_err(|e| Fault::last(path, e))
}

pub(crate) fn apply_remove(
    root: &mut dyn Graph,
    path: &Path,
    options: &ApplyOptions,
) -> Result<Value, Fault> {
    resolve(root, path, Write::Remove, options)?
        .remove()
        .map_err(|e| Fault::last(path, e))
}

pub(crate) fn apply_replace(
    root: &mut dyn Graph,
    path: &Path,
    value: &Value,
    options: &ApplyOptions,
) -> Result<(), Fault> {
    resolve(root, path, Write::Replace, options)?
        .replace(value, &options.coercion)
        .map_err(|e| Fault::last(path, e))
}

pub(crate) fn apply_test(
    root: &dyn Graph,
    path: &Path,
    value: &Value,
    options: &ApplyOptions,
) -> Result<(), Fault> {
    let equal = locate(root, path)?
        .matches(value, &options.coercion)
        .map_err(|e| Fault::last(path, e))?;
    if equal {
        Ok(())
    } else {
        Err(Fault::last(path, PatchError::TestFailed))
    }
}

/// `path` as it reads before `from` is removed: in the sequence holding
/// `from`, indices at or past the removed element move up by one.
fn before_removal(root: &dyn Graph, from: &[String], path: &Path) -> Path {
    let mut adjusted = path.clone();
    let (Some(removed), Ok(container)) = (from.last(), parent(from)) else {
        return adjusted;
    };
    if !is_child(container, path) {
        return adjusted;
    }
    let in_sequence = locate(root, container)
        .map(|node| matches!(node.node(), NodeRef::Sequence(_)))
        .unwrap_or(false);
    let depth = container.len();
    let segment = &path[depth];
    if !in_sequence || !is_valid_index(segment) {
        return adjusted;
    }
    if let (Ok(removed), Ok(index)) = (removed.parse::<usize>(), segment.parse::<usize>()) {
        if index >= removed {
            adjusted[depth] = (index + 1).to_string();
        }
    }
    adjusted
}

/// Moves `from` to `path`.
///
/// Both ends are checked before anything is removed: the source must be
/// removable and the destination must accept the source's value.
pub(crate) fn apply_move(
    root: &mut dyn Graph,
    from: &Path,
    path: &Path,
    options: &ApplyOptions,
) -> Result<(), Fault> {
    if is_same_line(from, path) {
        return Err(Fault::whole(PatchError::InvalidMove));
    }
    let moved = locate(root, from).map_err(Fault::source)?.to_value();
    resolve(root, from, Write::Remove, options).map_err(Fault::source)?;
    let destination = before_removal(root, from, path);
    resolve(root, &destination, Write::Add, options)?
        .accepts(&moved, &options.coercion)
        .map_err(|e| Fault::last(path, e))?;

    apply_remove(root, from, options).map_err(Fault::source)?;
    let Err(fault) = apply_add(root, path, &moved, options) else {
        return Ok(());
    };
    if let Err(restore) = apply_add(root, from, &moved, options) {
        tracing::warn!(error = %restore.error, "could not restore move source");
    }
    Err(fault)
}

pub(crate) fn apply_copy(
    root: &mut dyn Graph,
    from: &Path,
    path: &Path,
    options: &ApplyOptions,
) -> Result<(), Fault> {
    let value = locate(root, from).map_err(Fault::source)?.to_value();
    apply_add(root, path, &value, options)
}

// ── Dispatch ──────────────────────────────────────────────────────────────

/// Parses the paths of `operation` and applies it to `root`.
pub(crate) fn apply_operation(
    root: &mut dyn Graph,
    operation: &Operation,
    options: &ApplyOptions,
) -> Result<(), Fault> {
    let path = options.paths.parse(operation.path())?;
    let source = || -> Result<Path, Fault> {
        let from = operation.from_path().unwrap_or_default();
        options.paths.parse(from).map_err(|e| Fault::from(e).source())
    };
    match operation {
        Operation::Add { value, .. } => apply_add(root, &path, value, options),
        Operation::Remove { .. } => apply_remove(root, &path, options).map(drop),
        Operation::Replace { value, .. } => apply_replace(root, &path, value, options),
        Operation::Test { value, .. } => apply_test(root, &path, value, options),
        Operation::Move { .. } => apply_move(root, &source()?, &path, options),
        Operation::Copy { .. } => apply_copy(root, &source()?, &path, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use typed_patch_pointer::parse_relaxed;

    fn p(path: &str) -> Path {
        parse_relaxed(path).unwrap()
    }

    fn options() -> ApplyOptions {
        ApplyOptions::default()
    }

    #[test]
    fn add_inserts_and_appends() {
        let mut doc = json!({"list": [1, 3]});
        apply_add(&mut doc, &p("/list/1"), &json!(2), &options()).unwrap();
        apply_add(&mut doc, &p("/list/-"), &json!(4), &options()).unwrap();
        apply_add(&mut doc, &p("/name"), &json!("x"), &options()).unwrap();
        assert_eq!(doc, json!({"list": [1, 2, 3, 4], "name": "x"}));
    }

    #[test]
    fn add_at_root_replaces_document() {
        let mut doc = json!({"a": 1});
        apply_add(&mut doc, &p(""), &json!([1]), &options()).unwrap();
        assert_eq!(doc, json!([1]));
    }

    #[test]
    fn remove_returns_removed_value() {
        let mut doc = json!({"list": [1, 2, 3], "a": {"b": true}});
        assert_eq!(apply_remove(&mut doc, &p("/list/0"), &options()).unwrap(), json!(1));
        assert_eq!(apply_remove(&mut doc, &p("/a/b"), &options()).unwrap(), json!(true));
        assert_eq!(doc, json!({"list": [2, 3], "a": {}}));
    }

    #[test]
    fn remove_missing_key_fails() {
        let mut doc = json!({"a": 1});
        let err = apply_remove(&mut doc, &p("/b"), &options()).unwrap_err();
        assert_eq!(err, Fault::at(0, PatchError::UnknownMember));
    }

    #[test]
    fn replace_does_not_shift() {
        let mut doc = json!([1, 2, 3]);
        apply_replace(&mut doc, &p("/1"), &json!(9), &options()).unwrap();
        assert_eq!(doc, json!([1, 9, 3]));
        let err = apply_replace(&mut doc, &p("/3"), &json!(0), &options()).unwrap_err();
        assert_eq!(err.error, PatchError::IndexOutOfRange);
        assert_eq!(doc, json!([1, 9, 3]));
    }

    #[test]
    fn test_compares_snapshots() {
        let doc = json!({"a": [1, {"b": null}]});
        apply_test(&doc, &p("/a/1"), &json!({"b": null}), &options()).unwrap();
        let err = apply_test(&doc, &p("/a/0"), &json!(2), &options()).unwrap_err();
        assert_eq!(err, Fault::at(1, PatchError::TestFailed));
    }

    #[test]
    fn move_between_branches() {
        let mut doc = json!({"a": {"x": 1}, "b": {}});
        apply_move(&mut doc, &p("/a/x"), &p("/b/y"), &options()).unwrap();
        assert_eq!(doc, json!({"a": {}, "b": {"y": 1}}));
    }

    #[test]
    fn move_into_own_child_is_rejected() {
        let mut doc = json!({"a": {"b": 1}});
        let err = apply_move(&mut doc, &p("/a"), &p("/a/b"), &options()).unwrap_err();
        assert_eq!(err.error, PatchError::InvalidMove);
        let err = apply_move(&mut doc, &p("/a/b"), &p("/a/b"), &options()).unwrap_err();
        assert_eq!(err.error, PatchError::InvalidMove);
        assert_eq!(doc, json!({"a": {"b": 1}}));
    }

    #[test]
    fn failed_move_restores_source() {
        let mut doc = json!({"list": [1, 2], "other": []});
        let err = apply_move(&mut doc, &p("/list/0"), &p("/other/5"), &options()).unwrap_err();
        assert_eq!(err, Fault::at(1, PatchError::IndexOutOfRange));
        assert_eq!(doc, json!({"list": [1, 2], "other": []}));
    }

    #[test]
    fn move_forward_within_sequence() {
        let mut doc = json!([1, 2, 3]);
        apply_move(&mut doc, &p("/0"), &p("/2"), &options()).unwrap();
        assert_eq!(doc, json!([2, 3, 1]));

        let err = apply_move(&mut doc, &p("/0"), &p("/3"), &options()).unwrap_err();
        assert_eq!(err, Fault::at(0, PatchError::IndexOutOfRange));
        assert_eq!(doc, json!([2, 3, 1]));
    }

    #[test]
    fn destination_is_read_as_after_removal() {
        let doc = json!({"list": [[0], [1], [2]], "map": {"0": 0, "1": 1}});
        let shifted = before_removal(&doc, &p("/list/0"), &p("/list/1/0"));
        assert_eq!(shifted, p("/list/2/0"));
        let unchanged = before_removal(&doc, &p("/list/2"), &p("/list/1/-"));
        assert_eq!(unchanged, p("/list/1/-"));
        let map_keys = before_removal(&doc, &p("/map/0"), &p("/map/1"));
        assert_eq!(map_keys, p("/map/1"));
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Item {
        name: String,
        weight: f64,
        id: u32,
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Bag {
        items: Vec<Item>,
        other: Vec<Item>,
        weights: Vec<u8>,
    }

    crate::record! {
        Item { "Name" => name, "Weight" => weight }
        readonly { "Id" => id }
    }
    crate::record!(Bag { "Items" => items, "Other" => other, "Weights" => weights });

    fn bag() -> Bag {
        Bag {
            items: vec![Item { name: "a".to_string(), weight: 1.5, id: 7 }],
            ..Bag::default()
        }
    }

    #[test]
    fn records_with_read_only_members_can_be_copied_and_tested() {
        let mut graph = bag();
        apply_copy(&mut graph, &p("/Items/0"), &p("/Items/-"), &options()).unwrap();
        assert_eq!(graph.items[1], Item { name: "a".to_string(), weight: 1.5, id: 0 });
        assert_eq!(graph.items[0].id, 7);

        let snapshot = json!({"Name": "a", "Weight": 1.5, "Id": 7});
        apply_test(&graph, &p("/Items/0"), &snapshot, &options()).unwrap();
        apply_test(&graph, &p("/Items/0"), &json!({"Name": "a", "Weight": 1.5}), &options()).unwrap();
        let err = apply_test(&graph, &p("/Items/0"), &json!({"Name": "a", "Weight": 1.5, "Id": 8}), &options())
            .unwrap_err();
        assert_eq!(err.error, PatchError::TestFailed);
    }

    #[test]
    fn records_with_read_only_members_can_be_moved() {
        let mut graph = bag();
        apply_move(&mut graph, &p("/Items/0"), &p("/Other/-"), &options()).unwrap();
        assert!(graph.items.is_empty());
        assert_eq!(graph.other[0].name, "a");
    }

    #[test]
    fn rejected_destination_leaves_record_in_place() {
        let mut graph = bag();
        let err = apply_move(&mut graph, &p("/Items/0"), &p("/Weights/-"), &options()).unwrap_err();
        assert!(matches!(err.error, PatchError::TypeMismatch(_)));
        assert!(!err.from);
        assert_eq!(graph, bag());
    }

    #[test]
    fn unrepresentable_snapshot_is_not_moved() {
        // NaN snapshots as null, which no f64 slot accepts.
        let mut graph = bag();
        graph.items[0].weight = f64::NAN;
        let err = apply_move(&mut graph, &p("/Items/0"), &p("/Other/0"), &options()).unwrap_err();
        assert!(matches!(err.error, PatchError::TypeMismatch(_)));
        assert_eq!(graph.items.len(), 1);
        assert!(graph.items[0].weight.is_nan());
        assert!(graph.other.is_empty());

        let err = apply_copy(&mut graph, &p("/Items/0"), &p("/Items/-"), &options()).unwrap_err();
        assert!(matches!(err.error, PatchError::TypeMismatch(_)));
        assert_eq!(graph.items.len(), 1);
    }

    #[test]
    fn move_source_faults_are_marked() {
        let mut doc = json!({"a": 1});
        let err = apply_move(&mut doc, &p("/missing"), &p("/b"), &options()).unwrap_err();
        assert!(err.from);
        assert_eq!(err.error, PatchError::UnknownMember);
    }

    #[test]
    fn copy_leaves_source_intact() {
        let mut doc = json!({"a": [1, 2], "b": []});
        apply_copy(&mut doc, &p("/a"), &p("/b/-"), &options()).unwrap();
        assert_eq!(doc, json!({"a": [1, 2], "b": [[1, 2]]}));
    }

    #[test]
    fn dispatch_reports_malformed_paths() {
        let mut doc = json!({});
        let op = Operation::Remove { path: "/a~2".to_string() };
        let err = apply_operation(&mut doc, &op, &options()).unwrap_err();
        assert_eq!(err, Fault::at(0, PatchError::MalformedPath));

        let op = Operation::Copy { from: "/x~".to_string(), path: "/y".to_string() };
        let err = apply_operation(&mut doc, &op, &options()).unwrap_err();
        assert!(err.from);
        assert_eq!(err.error, PatchError::MalformedPath);
    }
}
