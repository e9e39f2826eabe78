//! daoql - backend-independent clause queries with a DAO facade.
//!
//! Queries are expressed as ordered lists of composable [`Clause`]
//! values: match-by-example, raw where fragments, sort, range windows,
//! eager-fetch hints, count, and distinct projections. A
//! [`QueryBuilder`] translates the clause list into a statement string
//! executed through the narrow [`Store`] boundary, and results stream
//! through the forward-only [`PagedCursor`].
//!
//! ```
//! use daoql::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct User {
//!     id: u64,
//!     name: Option<String>,
//! }
//!
//! impl Matchable for User {
//!     fn match_fields(&self) -> Vec<(&'static str, MatchValue<'_>)> {
//!         vec![("name", MatchValue::from_option(&self.name))]
//!     }
//!
//!     fn type_name(&self) -> &'static str {
//!         "User"
//!     }
//! }
//!
//! impl Entity for User {
//!     const NAME: &'static str = "User";
//!     type Key = u64;
//!
//!     fn primary_key(&self) -> u64 {
//!         self.id
//!     }
//! }
//!
//! let clauses = ClauseList::new()
//!     .with(Clause::Match(User { id: 0, name: Some("Ada".into()) }))
//!     .with(Clause::ascending(["name"]))
//!     .with(Clause::range(0, 10));
//! let built = QueryBuilder::new(&clauses).build()?;
//! assert_eq!(
//!     built.statement,
//!     "select from User as target where 1 = 1 and target.name = 'Ada' \
//!      order by target.name asc"
//! );
//! # Ok::<(), daoql::QueryError>(())
//! ```

pub use daoql_core::{
    builder, clause, cursor, dao, entity, error, matcher, registry, statement, store,
};

pub use daoql_core::{
    BuiltQuery, Clause, ClauseKind, ClauseList, Dao, DaoRegistry, Entity, ErasedDao,
    MatchExtractor, MatchValue, Matchable, PagedCursor, PreparedQuery, Projection, QueryBuilder,
    QueryError, ScalarValue, StatementText, Store, StoreError, Window, DEFAULT_PAGE_SIZE,
};

#[cfg(feature = "memory")]
pub use daoql_mem::MemoryStore;

/// Convenience re-exports for the common surface.
pub mod prelude {
    pub use crate::{
        Clause, ClauseKind, ClauseList, Dao, Entity, MatchValue, Matchable, PagedCursor,
        QueryBuilder, QueryError, ScalarValue, Store, StoreError, Window,
    };

    #[cfg(feature = "memory")]
    pub use crate::MemoryStore;
}
