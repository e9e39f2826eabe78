//! Clause taxonomy and the ordered clause container.
//!
//! A clause is an immutable, typed filter/sort/shape directive. Clauses
//! are modeled as a closed sum type so the builder's translation switch is
//! exhaustive and compiler-checked.

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single declarative directive contributed to a query.
///
/// `T` is the entity type the query targets; it only appears in the
/// [`Match`](Clause::Match) payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Clause<T> {
    /// Example instance whose non-null matchable properties become
    /// equality constraints. Mutually exclusive with `Where`.
    Match(T),
    /// Raw, backend-language-specific boolean fragment. Mutually
    /// exclusive with `Match`.
    Where(String),
    /// Ascending sort over an ordered list of fields.
    Ascending(Vec<String>),
    /// Descending sort over an ordered list of fields.
    Descending(Vec<String>),
    /// Result window: zero-based first row index and maximum row count.
    Range {
        /// Zero-based index of the first row to return.
        first: u64,
        /// Maximum number of rows to return.
        count: u64,
    },
    /// Eager-join hint for an association field. May repeat.
    Fetch(String),
    /// Marks the query as a cardinality query instead of a row query.
    Count,
    /// De-duplicated projection on a field. May repeat.
    Distinct(String),
}

impl<T> Clause<T> {
    /// Ascending sort over the given fields.
    pub fn ascending<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Clause::Ascending(fields.into_iter().map(Into::into).collect())
    }

    /// Descending sort over the given fields.
    pub fn descending<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Clause::Descending(fields.into_iter().map(Into::into).collect())
    }

    /// Raw boolean fragment in the backend's query language.
    pub fn where_fragment(fragment: impl Into<String>) -> Self {
        Clause::Where(fragment.into())
    }

    /// Result window starting at `first` with at most `count` rows.
    pub fn range(first: u64, count: u64) -> Self {
        Clause::Range { first, count }
    }

    /// Eager-join hint for the named association.
    pub fn fetch(field: impl Into<String>) -> Self {
        Clause::Fetch(field.into())
    }

    /// De-duplicated projection on the named field.
    pub fn distinct(field: impl Into<String>) -> Self {
        Clause::Distinct(field.into())
    }

    /// The kind tag of this clause.
    pub fn kind(&self) -> ClauseKind {
        match self {
            Clause::Match(_) => ClauseKind::Match,
            Clause::Where(_) => ClauseKind::Where,
            Clause::Ascending(_) => ClauseKind::Ascending,
            Clause::Descending(_) => ClauseKind::Descending,
            Clause::Range { .. } => ClauseKind::Range,
            Clause::Fetch(_) => ClauseKind::Fetch,
            Clause::Count => ClauseKind::Count,
            Clause::Distinct(_) => ClauseKind::Distinct,
        }
    }
}

/// Fieldless mirror of [`Clause`] used for lookups and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClauseKind {
    /// Match-by-example filter.
    Match,
    /// Raw boolean fragment filter.
    Where,
    /// Ascending sort.
    Ascending,
    /// Descending sort.
    Descending,
    /// Result window.
    Range,
    /// Eager-join hint.
    Fetch,
    /// Cardinality projection.
    Count,
    /// De-duplicated projection.
    Distinct,
}

impl ClauseKind {
    /// Whether at most one clause of this kind may appear per query.
    /// `Fetch` and `Distinct` may repeat; every other kind is a singleton.
    pub fn is_singleton(self) -> bool {
        !matches!(self, ClauseKind::Fetch | ClauseKind::Distinct)
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClauseKind::Match => "match",
            ClauseKind::Where => "where",
            ClauseKind::Ascending => "ascending",
            ClauseKind::Descending => "descending",
            ClauseKind::Range => "range",
            ClauseKind::Fetch => "fetch",
            ClauseKind::Count => "count",
            ClauseKind::Distinct => "distinct",
        };
        f.write_str(name)
    }
}

/// Ordered container of clauses with lookup-by-kind semantics.
///
/// Duplicate singleton clauses are a programming error detected at lookup
/// (build) time, not at insertion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseList<T> {
    clauses: Vec<Clause<T>>,
}

impl<T> ClauseList<T> {
    /// An empty clause list.
    pub fn new() -> Self {
        Self { clauses: Vec::new() }
    }

    /// Append a clause, builder-style.
    pub fn with(mut self, clause: Clause<T>) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Append a clause.
    pub fn add(&mut self, clause: Clause<T>) {
        self.clauses.push(clause);
    }

    /// Number of clauses in the list.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the list holds no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Iterate over the clauses in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Clause<T>> {
        self.clauses.iter()
    }

    /// Find the clause of the given kind, if present.
    ///
    /// Fails with [`QueryError::MultipleClauses`] when more than one
    /// clause of the kind is present. Repeatable kinds should be looked
    /// up with [`find_all`](Self::find_all) instead.
    pub fn find(&self, kind: ClauseKind) -> Result<Option<&Clause<T>>, QueryError> {
        let mut found = None;
        for clause in &self.clauses {
            if clause.kind() == kind {
                if found.is_some() {
                    return Err(QueryError::MultipleClauses(kind));
                }
                found = Some(clause);
            }
        }
        Ok(found)
    }

    /// All clauses of the given kind, in insertion order.
    pub fn find_all(&self, kind: ClauseKind) -> Vec<&Clause<T>> {
        self.clauses.iter().filter(|c| c.kind() == kind).collect()
    }
}

impl<T> Default for ClauseList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<Clause<T>>> for ClauseList<T> {
    fn from(clauses: Vec<Clause<T>>) -> Self {
        Self { clauses }
    }
}

impl<T> FromIterator<Clause<T>> for ClauseList<T> {
    fn from_iter<I: IntoIterator<Item = Clause<T>>>(iter: I) -> Self {
        Self {
            clauses: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for ClauseList<T> {
    type Item = Clause<T>;
    type IntoIter = std::vec::IntoIter<Clause<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.into_iter()
    }
}
