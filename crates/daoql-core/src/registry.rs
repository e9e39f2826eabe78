//! Cross-entity dao lookup with an explicit lifecycle.
//!
//! Components that need to reach the dao of another entity type receive a
//! `&DaoRegistry` instead of consulting process-wide static state. The
//! registry is populated at startup and frozen before use; registration
//! after the freeze is an error.

use crate::dao::Dao;
use crate::entity::Entity;
use crate::error::QueryError;
use crate::store::Store;
use std::collections::BTreeMap;

/// Type-erased dao handle, exposing the operations that make sense
/// without knowing the entity type.
pub trait ErasedDao {
    /// Name of the entity this dao manages.
    fn entity_name(&self) -> &'static str;

    /// Count every entity of this type.
    fn count_all(&self) -> Result<u64, QueryError>;

    /// Delete every entity of this type, returning how many were removed.
    fn delete_all(&self) -> Result<u64, QueryError>;
}

impl<T: Entity, S: Store<T>> ErasedDao for Dao<T, S> {
    fn entity_name(&self) -> &'static str {
        T::NAME
    }

    fn count_all(&self) -> Result<u64, QueryError> {
        self.count(Default::default())
    }

    fn delete_all(&self) -> Result<u64, QueryError> {
        Dao::delete_all(self)
    }
}

/// Registry mapping entity names to their daos.
#[derive(Default)]
pub struct DaoRegistry {
    daos: BTreeMap<&'static str, Box<dyn ErasedDao>>,
    frozen: bool,
}

impl DaoRegistry {
    /// An empty, unfrozen registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dao under its entity name.
    ///
    /// Fails after [`freeze`](Self::freeze) and on duplicate names.
    pub fn register(&mut self, dao: Box<dyn ErasedDao>) -> Result<(), QueryError> {
        if self.frozen {
            return Err(QueryError::RegistryFrozen);
        }
        let name = dao.entity_name();
        if self.daos.contains_key(name) {
            return Err(QueryError::DuplicateDao(name));
        }
        self.daos.insert(name, dao);
        Ok(())
    }

    /// Mark the registry read-only. Idempotent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether the registry no longer accepts registrations.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Look up the dao for an entity name.
    pub fn get(&self, entity_name: &str) -> Option<&dyn ErasedDao> {
        self.daos.get(entity_name).map(Box::as_ref)
    }

    /// The registered entity names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.daos.keys().copied()
    }
}
