//! Write eligibility of named record members.
//!
//! A [`MemberFilter`] is consulted before every write to a record member
//! (add, replace, remove, and both halves of a move). A member it refuses
//! fails with `MemberExcluded`. Map keys and sequence elements are not
//! filtered.

use std::fmt;
use std::sync::{Arc, OnceLock};

/// Where a member write happens.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// `type_name` of the record being written.
    pub record: &'static str,
    /// Segments leading to the record (empty when the record is the root).
    pub path: &'a [String],
}

pub type MemberPredicate = Arc<dyn Fn(&FilterContext<'_>, &str) -> bool + Send + Sync>;

/// Supplies a member predicate on demand.
pub trait PredicateProvider: Send + Sync {
    /// `None` means every member may be written.
    fn member_filter(&self) -> Option<MemberPredicate>;
}

#[derive(Clone, Default)]
pub enum MemberFilter {
    /// Every member may be written.
    #[default]
    All,
    /// Only the listed member names (ordinal comparison).
    Include(Arc<[String]>),
    Custom(MemberPredicate),
    /// Predicate obtained from a provider on first use, then reused.
    Provided(Arc<ProvidedFilter>),
}

impl MemberFilter {
    /// Builds an include list. Every item may hold several comma-separated
    /// names; pieces are trimmed and empty pieces dropped. An empty list
    /// allows every member.
    ///
    /// ```
    /// use typed_patch::MemberFilter;
    ///
    /// let filter = MemberFilter::include(["Name, Email", " Age "]);
    /// assert!(filter.allows("Person", &[], "Email"));
    /// assert!(filter.allows("Person", &[], "Age"));
    /// assert!(!filter.allows("Person", &[], "IsAdmin"));
    /// assert!(MemberFilter::include([" , "]).allows("Person", &[], "IsAdmin"));
    /// ```
    pub fn include<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = items
            .into_iter()
            .flat_map(|item| split_names(item.as_ref()))
            .collect();
        if names.is_empty() {
            MemberFilter::All
        } else {
            MemberFilter::Include(names.into())
        }
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&FilterContext<'_>, &str) -> bool + Send + Sync + 'static,
    {
        MemberFilter::Custom(Arc::new(predicate))
    }

    pub fn from_provider<P: PredicateProvider + 'static>(provider: P) -> Self {
        MemberFilter::Provided(Arc::new(ProvidedFilter {
            provider: Box::new(provider),
            predicate: OnceLock::new(),
        }))
    }

    /// Whether `member` of the record `record` at `path` may be written.
    pub fn allows(&self, record: &'static str, path: &[String], member: &str) -> bool {
        let context = FilterContext { record, path };
        match self {
            MemberFilter::All => true,
            MemberFilter::Include(names) => names.iter().any(|n| n == member),
            MemberFilter::Custom(predicate) => predicate(&context, member),
            MemberFilter::Provided(provided) => provided.allows(&context, member),
        }
    }
}

impl fmt::Debug for MemberFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberFilter::All => f.write_str("All"),
            MemberFilter::Include(names) => f.debug_tuple("Include").field(names).finish(),
            MemberFilter::Custom(_) => f.write_str("Custom(..)"),
            MemberFilter::Provided(provided) => {
                let state = if provided.predicate.get().is_some() { "resolved" } else { "pending" };
                f.debug_tuple("Provided").field(&state).finish()
            }
        }
    }
}

fn split_names(item: &str) -> Vec<String> {
    item.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// A provider together with its memoized predicate.
pub struct ProvidedFilter {
    provider: Box<dyn PredicateProvider>,
    predicate: OnceLock<Option<MemberPredicate>>,
}

impl ProvidedFilter {
    fn allows(&self, context: &FilterContext<'_>, member: &str) -> bool {
        match self.predicate.get_or_init(|| self.provider.member_filter()) {
            Some(predicate) => predicate(context, member),
            None => true,
        }
    }
}
