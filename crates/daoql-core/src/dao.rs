//! The DAO facade binding one entity type to a backing store.

use crate::builder::QueryBuilder;
use crate::clause::{Clause, ClauseKind, ClauseList};
use crate::cursor::PagedCursor;
use crate::entity::Entity;
use crate::error::QueryError;
use crate::store::{PreparedQuery, Store, Window};
use tracing::debug;

/// Default rows fetched per cursor page.
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Data-access facade for one entity type over one backing store.
///
/// The facade is synchronous and stateless across calls: each query
/// builds its own statement, and nothing is shared between concurrent
/// constructions. [`find_or_create`](Self::find_or_create) is
/// read-then-write and therefore not atomic with respect to concurrent
/// callers; uniqueness enforcement belongs to the backing store's own
/// constraints.
pub struct Dao<T: Entity, S: Store<T>> {
    store: S,
    page_size: u64,
    _entity: std::marker::PhantomData<fn() -> T>,
}

impl<T: Entity, S: Store<T>> Dao<T, S> {
    /// A dao over the given store with the default cursor page size.
    pub fn new(store: S) -> Self {
        Self {
            store,
            page_size: DEFAULT_PAGE_SIZE,
            _entity: std::marker::PhantomData,
        }
    }

    /// Override the cursor page size.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// The underlying store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist a new entity.
    pub fn create(&self, entity: &T) -> Result<(), QueryError> {
        debug!(entity = T::NAME, "create");
        Ok(self.store.persist(entity)?)
    }

    /// Read an entity by primary key.
    pub fn read(&self, key: &T::Key) -> Result<Option<T>, QueryError> {
        Ok(self.store.read(key)?)
    }

    /// Persist changes to an existing entity.
    pub fn update(&self, entity: &T) -> Result<(), QueryError> {
        debug!(entity = T::NAME, "update");
        Ok(self.store.persist(entity)?)
    }

    /// Remove an entity.
    pub fn delete(&self, entity: &T) -> Result<(), QueryError> {
        debug!(entity = T::NAME, "delete");
        Ok(self.store.remove(entity)?)
    }

    /// Delete every entity of this type, returning how many were removed.
    pub fn delete_all(&self) -> Result<u64, QueryError> {
        self.delete_where(ClauseList::new())
    }

    /// Delete all entities matching the filter clauses.
    pub fn delete_where(&self, clauses: ClauseList<T>) -> Result<u64, QueryError> {
        let built = QueryBuilder::new(&clauses).build_delete()?;
        debug!(entity = T::NAME, statement = %built.statement, "delete by query");
        Ok(self.store.execute_update(&built.statement)?)
    }

    /// Count the entities matching the given clauses.
    ///
    /// A `Count` clause is prepended unless the caller already supplied
    /// one.
    pub fn count(&self, clauses: ClauseList<T>) -> Result<u64, QueryError> {
        let has_count = clauses.find(ClauseKind::Count)?.is_some();
        let mut counted = ClauseList::new();
        if !has_count {
            counted.add(Clause::Count);
        }
        for clause in clauses {
            counted.add(clause);
        }
        let built = QueryBuilder::new(&counted).build()?;
        self.prepare(&built.statement)?.count().map_err(Into::into)
    }

    /// All entities matching the given clauses, materialized.
    pub fn find(&self, clauses: ClauseList<T>) -> Result<Vec<T>, QueryError> {
        let built = QueryBuilder::new(&clauses).build()?;
        self.prepare(&built.statement)?
            .rows(built.window)
            .map_err(Into::into)
    }

    /// The first entity matching the given clauses, if any.
    ///
    /// Executes with a single-row window instead of materializing every
    /// match; a caller-supplied `Range` keeps its offset.
    pub fn find_first(&self, clauses: ClauseList<T>) -> Result<Option<T>, QueryError> {
        let built = QueryBuilder::new(&clauses).build()?;
        let window = match built.window {
            Some(Window { first, count }) => Window::new(first, count.min(1)),
            None => Window::new(0, 1),
        };
        let rows = self.prepare(&built.statement)?.rows(Some(window))?;
        Ok(rows.into_iter().next())
    }

    /// A forward-only paged cursor over the entities matching the given
    /// clauses.
    pub fn query(&self, clauses: ClauseList<T>) -> Result<PagedCursor<'_, T>, QueryError> {
        let built = QueryBuilder::new(&clauses).build()?;
        Ok(PagedCursor::new(&self.store, built, self.page_size))
    }

    /// Find an entity matching the example, creating it on a miss.
    ///
    /// Not atomic: two concurrent callers can both observe "not found"
    /// and both insert. Uniqueness is delegated to the store.
    pub fn find_or_create(&self, example: T) -> Result<T, QueryError> {
        let clauses = ClauseList::new().with(Clause::Match(example.clone()));
        if let Some(found) = self.find_first(clauses)? {
            return Ok(found);
        }
        self.create(&example)?;
        Ok(example)
    }

    fn prepare<'s>(
        &'s self,
        statement: &str,
    ) -> Result<Box<dyn PreparedQuery<T> + 's>, QueryError> {
        self.store
            .prepare(statement)
            .map_err(|source| QueryError::Compilation {
                statement: statement.to_owned(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Matchable, MatchValue};
    use crate::store::StoreError;
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(u64);

    impl Matchable for Row {
        fn match_fields(&self) -> Vec<(&'static str, MatchValue<'_>)> {
            Vec::new()
        }

        fn type_name(&self) -> &'static str {
            "Row"
        }
    }

    impl Entity for Row {
        const NAME: &'static str = "Row";
        type Key = u64;

        fn primary_key(&self) -> u64 {
            self.0
        }
    }

    /// Serves windows out of a fixed row vector, recording the last
    /// window requested.
    struct WindowStore {
        rows: Vec<Row>,
        last_window: Cell<Option<Window>>,
    }

    impl WindowStore {
        fn of(n: u64) -> Self {
            Self {
                rows: (0..n).map(Row).collect(),
                last_window: Cell::new(None),
            }
        }
    }

    struct WindowPrepared<'a> {
        store: &'a WindowStore,
    }

    impl<'a> PreparedQuery<Row> for WindowPrepared<'a> {
        fn rows(&self, window: Option<Window>) -> Result<Vec<Row>, StoreError> {
            self.store.last_window.set(window);
            let (first, count) = match window {
                Some(w) => (w.first as usize, w.count as usize),
                None => (0, self.store.rows.len()),
            };
            Ok(self
                .store
                .rows
                .iter()
                .skip(first)
                .take(count)
                .cloned()
                .collect())
        }

        fn count(&self) -> Result<u64, StoreError> {
            Ok(self.store.rows.len() as u64)
        }
    }

    impl Store<Row> for WindowStore {
        fn prepare<'a>(
            &'a self,
            _statement: &str,
        ) -> Result<Box<dyn PreparedQuery<Row> + 'a>, StoreError> {
            Ok(Box::new(WindowPrepared { store: self }))
        }

        fn persist(&self, _entity: &Row) -> Result<(), StoreError> {
            unimplemented!("not exercised by these tests")
        }

        fn remove(&self, _entity: &Row) -> Result<(), StoreError> {
            unimplemented!("not exercised by these tests")
        }

        fn read(&self, _key: &u64) -> Result<Option<Row>, StoreError> {
            unimplemented!("not exercised by these tests")
        }

        fn execute_update(&self, _statement: &str) -> Result<u64, StoreError> {
            unimplemented!("not exercised by these tests")
        }
    }

    #[test]
    fn test_find_first_requests_single_row_window() {
        let dao = Dao::new(WindowStore::of(20));
        let first = dao.find_first(ClauseList::new()).unwrap();
        assert_eq!(first, Some(Row(0)));
        assert_eq!(dao.store().last_window.get(), Some(Window::new(0, 1)));
    }

    #[test]
    fn test_find_first_keeps_range_offset() {
        let dao = Dao::new(WindowStore::of(20));
        let clauses = ClauseList::new().with(Clause::range(10, 5));
        let first = dao.find_first(clauses).unwrap();
        assert_eq!(first, Some(Row(10)));
        assert_eq!(dao.store().last_window.get(), Some(Window::new(10, 1)));
    }

    #[test]
    fn test_find_first_on_empty_store() {
        let dao = Dao::new(WindowStore::of(0));
        assert_eq!(dao.find_first(ClauseList::new()).unwrap(), None);
        assert_eq!(dao.store().last_window.get(), Some(Window::new(0, 1)));
    }
}
