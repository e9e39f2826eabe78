//! The backing-store boundary.
//!
//! The engine consumes exactly one external interface: a collaborator
//! able to compile a statement string into an executable prepared query,
//! execute it with an optional result window, and perform CRUD-level
//! persist/remove/read-by-id operations. Session and connection lifecycle,
//! pooling, and transaction boundaries are the store's own concern.

use crate::entity::Entity;
use thiserror::Error;

/// A result window: zero-based offset and maximum row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Zero-based index of the first row to return.
    pub first: u64,
    /// Maximum number of rows to return.
    pub count: u64,
}

impl Window {
    /// A window starting at `first` with at most `count` rows.
    pub fn new(first: u64, count: u64) -> Self {
        Self { first, count }
    }
}

/// Errors surfaced by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The statement could not be compiled by this backend.
    #[error("statement rejected by backend: {0}")]
    InvalidStatement(String),

    /// The statement names an entity this store does not manage.
    #[error("unknown entity {0}")]
    UnknownEntity(String),

    /// Any other backend failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// A statement compiled by the backend, ready to execute.
pub trait PreparedQuery<T> {
    /// Execute as a row query, optionally limited to a window.
    fn rows(&self, window: Option<Window>) -> Result<Vec<T>, StoreError>;

    /// Execute as a cardinality query.
    fn count(&self) -> Result<u64, StoreError>;
}

/// A backing store bound to one entity type.
pub trait Store<T: Entity> {
    /// Compile a statement string into an executable query.
    fn prepare<'a>(
        &'a self,
        statement: &str,
    ) -> Result<Box<dyn PreparedQuery<T> + 'a>, StoreError>;

    /// Persist an entity (insert or update by identity).
    fn persist(&self, entity: &T) -> Result<(), StoreError>;

    /// Remove an entity by identity.
    fn remove(&self, entity: &T) -> Result<(), StoreError>;

    /// Read an entity by primary key.
    fn read(&self, key: &T::Key) -> Result<Option<T>, StoreError>;

    /// Execute a mutating statement (delete-by-query), returning the
    /// number of affected rows.
    fn execute_update(&self, statement: &str) -> Result<u64, StoreError>;
}
