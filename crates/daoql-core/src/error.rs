//! Core error types.

use crate::clause::ClauseKind;
use crate::store::StoreError;
use thiserror::Error;

/// Errors raised while constructing or executing a clause query.
///
/// Clause-shape and match-extraction errors fire before any backend
/// contact and are always fatal to the query construction. Backend errors
/// are wrapped, never swallowed or retried by this layer.
#[derive(Debug, Error)]
pub enum QueryError {
    /// More than one clause of a singleton kind was supplied.
    #[error("more than one {0} clause in query")]
    MultipleClauses(ClauseKind),

    /// Two mutually exclusive clauses were supplied together.
    #[error("cannot combine {first} and {second} clauses in one query")]
    ConflictingClauses {
        /// The clause that was applied first.
        first: ClauseKind,
        /// The clause it conflicts with.
        second: ClauseKind,
    },

    /// The example object declares no matchable properties.
    #[error("no matchable fields declared on example of type {0}")]
    NoMatchableFields(&'static str),

    /// Every matchable property on the example object was null.
    #[error("all matchable fields on example of type {0} were null")]
    AllMatchableFieldsNull(&'static str),

    /// A matchable property's value type has no equality-constraint
    /// encoding.
    #[error("cannot encode match constraint for field {field}: unsupported type {type_name}")]
    UnsupportedMatchType {
        /// Dotted path of the offending field.
        field: String,
        /// Name of the unsupported value type.
        type_name: &'static str,
    },

    /// The backend rejected the generated statement. Carries the statement
    /// text for diagnostics.
    #[error("query compilation failed for statement `{statement}`: {source}")]
    Compilation {
        /// The generated statement text.
        statement: String,
        /// The backend's own error.
        source: StoreError,
    },

    /// A backend execution or CRUD failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The registry no longer accepts registrations.
    #[error("dao registry is frozen; daos must be registered at startup")]
    RegistryFrozen,

    /// A dao for this entity name is already registered.
    #[error("a dao for entity {0} is already registered")]
    DuplicateDao(&'static str),
}
