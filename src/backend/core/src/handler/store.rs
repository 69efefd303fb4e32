//! Entity lookup used by entity-bound guards.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::request::RouteParams;
use crate::access::Secured;
use crate::error::{PortcullisError, Result};

/// Locates the entity a request addresses.
pub trait EntityStore<E>: Send + Sync {
    /// `Ok(Some(_))` for an addressed existing record, `Ok(None)` when the
    /// request addresses no record at all (creation, listing). An addressed
    /// record that does not exist is an error, not `None`.
    fn locate(&self, params: &RouteParams) -> Result<Option<E>>;
}

impl<E, S: EntityStore<E> + ?Sized> EntityStore<E> for Arc<S> {
    fn locate(&self, params: &RouteParams) -> Result<Option<E>> {
        (**self).locate(params)
    }
}

/// Thread-safe in-memory table of entities keyed by UUID.
///
/// Records are addressed by the `id` route parameter unless another key is
/// configured with [`InMemoryStore::addressed_by`].
#[derive(Debug)]
pub struct InMemoryStore<E> {
    records: Arc<RwLock<HashMap<Uuid, E>>>,
    key: &'static str,
}

impl<E> Clone for InMemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            key: self.key,
        }
    }
}

impl<E> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            key: "id",
        }
    }
}

impl<E: Clone> InMemoryStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A view of the same records addressed by a different route parameter.
    pub fn addressed_by(&self, key: &'static str) -> Self {
        Self {
            records: self.records.clone(),
            key,
        }
    }

    pub fn insert(&self, id: Uuid, entity: E) {
        self.records.write().insert(id, entity);
    }

    pub fn get(&self, id: &Uuid) -> Option<E> {
        self.records.read().get(id).cloned()
    }

    /// Apply `f` to the stored record, returning the updated copy.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut E)) -> Option<E> {
        let mut records = self.records.write();
        let entity = records.get_mut(id)?;
        f(entity);
        Some(entity.clone())
    }

    pub fn remove(&self, id: &Uuid) -> Option<E> {
        self.records.write().remove(id)
    }

    /// Remove the record only if `check` passes against its current state.
    ///
    /// `check` runs under the write lock, so no concurrent update can land
    /// between the check and the removal. `Ok(None)` when no record exists.
    pub fn remove_if(&self, id: &Uuid, check: impl FnOnce(&E) -> Result<()>) -> Result<Option<E>> {
        let mut records = self.records.write();
        let Some(entity) = records.get(id) else {
            return Ok(None);
        };
        check(entity)?;
        Ok(records.remove(id))
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Snapshot of every stored record, in no particular order.
    pub fn values(&self) -> Vec<E> {
        self.records.read().values().cloned().collect()
    }
}

impl<E: Secured + Clone> EntityStore<E> for InMemoryStore<E> {
    fn locate(&self, params: &RouteParams) -> Result<Option<E>> {
        let Some(id) = params.uuid(self.key)? else {
            return Ok(None);
        };

        self.get(&id)
            .map(Some)
            .ok_or_else(|| PortcullisError::not_found(E::KIND, id.to_string()))
    }
}
