//! Type definitions for patch paths.

/// A single unescaped path segment.
///
/// Whether a segment names a record member, a map key, a sequence index or the
/// append marker is decided by the node it is applied to, not by the parser.
pub type PathStep = String;

/// A parsed path. The empty path denotes the root of the graph.
pub type Path = Vec<PathStep>;

/// The append marker: "insert after the last element" of a sequence.
pub const APPEND_MARKER: &str = "-";
