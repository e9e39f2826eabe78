//! daoql core - clause taxonomy, query building, and the DAO facade.
//!
//! Callers express filtering, sorting, range-limiting, and
//! match-by-example as composable, serializable clauses. A builder
//! translates an ordered clause list into a backend-executable statement
//! plus a result window, and results stream through a forward-only,
//! memory-bounded paged cursor. The persistence engine itself sits behind
//! the narrow [`Store`] boundary.

pub mod builder;
pub mod clause;
pub mod cursor;
pub mod dao;
pub mod entity;
pub mod error;
pub mod matcher;
pub mod registry;
pub mod statement;
pub mod store;

pub use builder::{BuiltQuery, Projection, QueryBuilder};
pub use clause::{Clause, ClauseKind, ClauseList};
pub use cursor::PagedCursor;
pub use dao::{Dao, DEFAULT_PAGE_SIZE};
pub use entity::{Entity, Matchable, MatchValue, ScalarValue};
pub use error::QueryError;
pub use matcher::MatchExtractor;
pub use registry::{DaoRegistry, ErasedDao};
pub use statement::StatementText;
pub use store::{PreparedQuery, Store, StoreError, Window};
