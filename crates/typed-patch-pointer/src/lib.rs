//! Patch path utilities.
//!
//! Paths are slash-delimited strings in the JSON Pointer (RFC 6901) style:
//! each segment between `/` separators is unescaped (`~1` → `/`, `~0` → `~`).
//! Unlike RFC 6901, both `""` and `"/"` denote the root.
//!
//! # Example
//!
//! ```
//! use typed_patch_pointer::{format, parse, parse_relaxed};
//!
//! let path = parse("/DownDocs/0/Integers/0").unwrap();
//! assert_eq!(path, vec!["DownDocs", "0", "Integers", "0"]);
//! assert_eq!(format(&path), "/DownDocs/0/Integers/0");
//!
//! // The leading separator is optional in relaxed mode.
//! assert_eq!(parse_relaxed("DownDocs/0").unwrap(), vec!["DownDocs", "0"]);
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep, APPEND_MARKER};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("path must start with `/`: {0:?}")]
    NotRooted(String),
    #[error("invalid escape sequence in segment {segment}")]
    InvalidEscape { segment: usize },
    #[error("path has no parent")]
    NoParent,
}

impl PointerError {
    /// Index of the segment the error was detected in, if any.
    pub fn segment(&self) -> Option<usize> {
        match self {
            PointerError::InvalidEscape { segment } => Some(*segment),
            PointerError::NotRooted(_) | PointerError::NoParent => None,
        }
    }
}

/// Unescapes a path segment.
///
/// `~1` becomes `/` and `~0` becomes `~`. A `~` that is not followed by `0`
/// or `1` is invalid and yields `None`.
///
/// # Example
///
/// ```
/// use typed_patch_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b").as_deref(), Some("a~b"));
/// assert_eq!(unescape_component("c~1d").as_deref(), Some("c/d"));
/// assert_eq!(unescape_component("~01").as_deref(), Some("~1"));
/// assert_eq!(unescape_component("bad~2"), None);
/// ```
pub fn unescape_component(component: &str) -> Option<String> {
    if !component.contains('~') {
        return Some(component.to_string());
    }
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('1') => out.push('/'),
            Some('0') => out.push('~'),
            _ => return None,
        }
    }
    Some(out)
}

/// Escapes a path segment.
///
/// # Example
///
/// ```
/// use typed_patch_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// assert_eq!(escape_component("plain"), "plain");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // `~` first, otherwise the `~` introduced by `~1` would be escaped again.
    component.replace('~', "~0").replace('/', "~1")
}

/// Parses a rooted path (`/a/b`). The empty string and `/` parse to the root.
///
/// # Errors
///
/// [`PointerError::NotRooted`] when a non-empty path lacks the leading `/`,
/// [`PointerError::InvalidEscape`] when a segment holds a stray `~`.
pub fn parse(pointer: &str) -> Result<Path, PointerError> {
    match pointer.strip_prefix('/') {
        Some(body) => split_segments(body),
        None if pointer.is_empty() => Ok(Path::new()),
        None => Err(PointerError::NotRooted(pointer.to_string())),
    }
}

/// Parses a path whose leading `/` is optional (`a/b` and `/a/b` are equal).
pub fn parse_relaxed(pointer: &str) -> Result<Path, PointerError> {
    split_segments(pointer.strip_prefix('/').unwrap_or(pointer))
}

fn split_segments(body: &str) -> Result<Path, PointerError> {
    if body.is_empty() {
        return Ok(Path::new());
    }
    body.split('/')
        .enumerate()
        .map(|(segment, component)| {
            unescape_component(component).ok_or(PointerError::InvalidEscape { segment })
        })
        .collect()
}

/// Formats path segments back into a rooted path string.
///
/// Returns an empty string for the root.
///
/// # Example
///
/// ```
/// use typed_patch_pointer::format;
///
/// assert_eq!(format(&[]), "");
/// assert_eq!(format(&["a/b".to_string(), "0".to_string()]), "/a~1b/0");
/// ```
pub fn format(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Check if `child` lies strictly below `parent`.
///
/// # Example
///
/// ```
/// use typed_patch_pointer::is_child;
///
/// let parent = vec!["a".to_string()];
/// let child = vec!["a".to_string(), "b".to_string()];
/// assert!(is_child(&parent, &child));
/// assert!(!is_child(&child, &parent));
/// assert!(!is_child(&parent, &parent));
/// ```
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && child.starts_with(parent)
}

/// Check if one path is equal to, or an ancestor of, the other.
pub fn is_same_line(p1: &[String], p2: &[String]) -> bool {
    p1.starts_with(p2) || p2.starts_with(p1)
}

/// Get the parent path of a given path.
///
/// # Errors
///
/// Returns [`PointerError::NoParent`] for the root.
pub fn parent(path: &[String]) -> Result<&[String], PointerError> {
    match path.split_last() {
        Some((_, parent)) => Ok(parent),
        None => Err(PointerError::NoParent),
    }
}

/// Check if a segment is a canonical non-negative index: ASCII digits
/// without a leading zero.
///
/// # Example
///
/// ```
/// use typed_patch_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index(""));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    let bytes = index.as_bytes();
    match bytes {
        [] => false,
        [b'0', _, ..] => false,
        _ => bytes.iter().all(u8::is_ascii_digit),
    }
}
