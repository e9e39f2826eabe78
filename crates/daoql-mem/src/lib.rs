//! In-memory backing store for daoql.
//!
//! `MemoryStore` implements the [`Store`] boundary over a vector guarded
//! by a `parking_lot::RwLock`, with a small evaluator for the statement
//! grammar the query builder generates. It is the reference collaborator
//! for integration tests and a convenient embedded backend.

mod eval;

use daoql_core::{Entity, PreparedQuery, Store, StoreError, Window};
use eval::{ParsedStatement, StatementKind};
use parking_lot::RwLock;
use tracing::debug;

/// An in-memory store for one entity type.
///
/// `persist` is an upsert keyed on the entity's primary key; `remove` of
/// an absent entity is an idempotent no-op. Identity and uniqueness
/// enforcement beyond the primary key stays the caller's concern, as with
/// any backing store.
#[derive(Debug)]
pub struct MemoryStore<T: Entity> {
    rows: RwLock<Vec<T>>,
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> MemoryStore<T> {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether the store holds no entities.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn check_entity(&self, parsed: &ParsedStatement) -> Result<(), StoreError> {
        if parsed.entity != T::NAME {
            return Err(StoreError::UnknownEntity(parsed.entity.clone()));
        }
        Ok(())
    }
}

/// A statement parsed against a [`MemoryStore`]; each execution reads the
/// store's current contents.
pub struct MemoryPrepared<'a, T: Entity> {
    store: &'a MemoryStore<T>,
    parsed: ParsedStatement,
}

impl<'a, T: Entity> PreparedQuery<T> for MemoryPrepared<'a, T> {
    fn rows(&self, window: Option<Window>) -> Result<Vec<T>, StoreError> {
        let rows = self.store.rows.read();
        let mut matching = self.parsed.matching(&rows);
        if let Some(Window { first, count }) = window {
            let first = usize::try_from(first).unwrap_or(usize::MAX);
            let count = usize::try_from(count).unwrap_or(usize::MAX);
            matching = matching
                .into_iter()
                .skip(first)
                .take(count)
                .collect();
        }
        Ok(matching)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let rows = self.store.rows.read();
        Ok(self.parsed.matching(&rows).len() as u64)
    }
}

impl<T: Entity> Store<T> for MemoryStore<T> {
    fn prepare<'a>(
        &'a self,
        statement: &str,
    ) -> Result<Box<dyn PreparedQuery<T> + 'a>, StoreError> {
        let parsed = ParsedStatement::parse(statement)?;
        self.check_entity(&parsed)?;
        if parsed.kind == StatementKind::Delete {
            return Err(StoreError::InvalidStatement(statement.to_owned()));
        }
        Ok(Box::new(MemoryPrepared {
            store: self,
            parsed,
        }))
    }

    fn persist(&self, entity: &T) -> Result<(), StoreError> {
        let key = entity.primary_key();
        let mut rows = self.rows.write();
        match rows.iter_mut().find(|r| r.primary_key() == key) {
            Some(existing) => *existing = entity.clone(),
            None => rows.push(entity.clone()),
        }
        Ok(())
    }

    fn remove(&self, entity: &T) -> Result<(), StoreError> {
        let key = entity.primary_key();
        self.rows.write().retain(|r| r.primary_key() != key);
        Ok(())
    }

    fn read(&self, key: &T::Key) -> Result<Option<T>, StoreError> {
        Ok(self
            .rows
            .read()
            .iter()
            .find(|r| r.primary_key() == *key)
            .cloned())
    }

    fn execute_update(&self, statement: &str) -> Result<u64, StoreError> {
        let parsed = ParsedStatement::parse(statement)?;
        self.check_entity(&parsed)?;
        if parsed.kind != StatementKind::Delete {
            return Err(StoreError::InvalidStatement(statement.to_owned()));
        }
        let mut rows = self.rows.write();
        let doomed = parsed.matching(&rows);
        let before = rows.len();
        rows.retain(|r| {
            !doomed
                .iter()
                .any(|d| d.primary_key() == r.primary_key())
        });
        let removed = (before - rows.len()) as u64;
        debug!(entity = T::NAME, removed, "executed delete statement");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daoql_core::{Matchable, MatchValue};

    #[derive(Debug, Clone, PartialEq)]
    struct Track {
        id: u64,
        title: Option<String>,
        plays: Option<i64>,
    }

    impl Matchable for Track {
        fn match_fields(&self) -> Vec<(&'static str, MatchValue<'_>)> {
            vec![
                ("title", MatchValue::from_option(&self.title)),
                ("plays", MatchValue::from_option(&self.plays)),
            ]
        }

        fn type_name(&self) -> &'static str {
            "Track"
        }
    }

    impl Entity for Track {
        const NAME: &'static str = "Track";
        type Key = u64;

        fn primary_key(&self) -> u64 {
            self.id
        }
    }

    fn track(id: u64, title: &str, plays: i64) -> Track {
        Track {
            id,
            title: Some(title.into()),
            plays: Some(plays),
        }
    }

    fn seeded() -> MemoryStore<Track> {
        let store = MemoryStore::new();
        store.persist(&track(1, "alpha", 10)).unwrap();
        store.persist(&track(2, "beta", 30)).unwrap();
        store.persist(&track(3, "gamma", 20)).unwrap();
        store
    }

    #[test]
    fn test_persist_is_upsert() {
        let store = seeded();
        store.persist(&track(2, "beta prime", 31)).unwrap();
        assert_eq!(store.len(), 3);
        let read = store.read(&2).unwrap().unwrap();
        assert_eq!(read.title.as_deref(), Some("beta prime"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = seeded();
        let victim = track(3, "gamma", 20);
        store.remove(&victim).unwrap();
        store.remove(&victim).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_constraint_filtering() {
        let store = seeded();
        let prepared = store
            .prepare("select from Track as target where 1 = 1 and target.title = 'beta'")
            .unwrap();
        let rows = prepared.rows(None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 2);
    }

    #[test]
    fn test_order_and_window() {
        let store = seeded();
        let prepared = store
            .prepare("select from Track as target where 1 = 1 order by target.plays desc")
            .unwrap();
        let rows = prepared.rows(Some(Window::new(1, 2))).unwrap();
        let ids: Vec<u64> = rows.iter().map(|t| t.id).collect();
        // Descending plays: 2 (30), 3 (20), 1 (10); window skips the first.
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_count_statement() {
        let store = seeded();
        let prepared = store
            .prepare("select count(*) from Track as target where 1 = 1")
            .unwrap();
        assert_eq!(prepared.count().unwrap(), 3);
    }

    #[test]
    fn test_distinct_rows() {
        let store = seeded();
        store.persist(&track(4, "alpha", 99)).unwrap();
        let prepared = store
            .prepare("select distinct target.title from Track as target where 1 = 1")
            .unwrap();
        assert_eq!(prepared.rows(None).unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_entity_rejected() {
        let store = seeded();
        let result = store.prepare("select from Album as target where 1 = 1");
        assert!(matches!(result, Err(StoreError::UnknownEntity(name)) if name == "Album"));
    }

    #[test]
    fn test_delete_statement() {
        let store = seeded();
        let removed = store
            .execute_update("delete from Track as target where 1 = 1 and target.title = 'beta'")
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_statement_not_queryable() {
        let store = seeded();
        assert!(store
            .prepare("delete from Track as target where 1 = 1")
            .is_err());
        assert!(store
            .execute_update("select from Track as target where 1 = 1")
            .is_err());
    }
}
