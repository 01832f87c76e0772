//! Options for applying a patch document.

use typed_patch_pointer::{Path, PointerError};

use crate::coerce::{Coercion, UnknownKeys};
use crate::filter::MemberFilter;

/// How operation paths are parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathSyntax {
    /// The leading `/` is optional: `DownDocs/0` equals `/DownDocs/0`.
    #[default]
    Relaxed,
    /// Every non-root path must start with `/`.
    Strict,
}

impl PathSyntax {
    pub fn parse(self, path: &str) -> Result<Path, PointerError> {
        match self {
            PathSyntax::Relaxed => typed_patch_pointer::parse_relaxed(path),
            PathSyntax::Strict => typed_patch_pointer::parse(path),
        }
    }
}

/// Options for [`crate::apply_with`] and friends.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub paths: PathSyntax,
    pub coercion: Coercion,
    pub filter: MemberFilter,
}

impl ApplyOptions {
    pub fn with_paths(mut self, paths: PathSyntax) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_unknown_keys(mut self, unknown_keys: UnknownKeys) -> Self {
        self.coercion.unknown_keys = unknown_keys;
        self
    }

    pub fn with_filter(mut self, filter: MemberFilter) -> Self {
        self.filter = filter;
        self
    }
}
