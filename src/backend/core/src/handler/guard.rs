//! Guards decide, before dispatch, whether a request may proceed.

use std::marker::PhantomData;

use super::request::RequestContext;
use super::store::EntityStore;
use crate::access::{AccessResponse, ActionList, Secured};
use crate::error::Result;

/// A guard's answer plus the record it located, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Checked<T> {
    pub response: AccessResponse,
    /// The existing record the request addressed. `None` for requests that
    /// address nothing, even though the check ran against an empty instance.
    pub target: Option<T>,
}

/// The access step run before a wrapped handler.
pub trait AccessGuard: Send + Sync {
    /// Record type located during the check and handed to the handler.
    type Target;

    /// Actions the request must be permitted to perform.
    fn required_actions(&self) -> &ActionList;

    /// Evaluate access for `request`.
    fn check_access(&self, request: &RequestContext) -> Result<Checked<Self::Target>>;

    /// Reduce a response to grant/deny.
    fn grant_access(&self, response: &AccessResponse) -> bool {
        response.is_granted()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Open Guard
// ═══════════════════════════════════════════════════════════════════════════════

/// Guard for handlers not bound to an entity type. It always answers
/// [`AccessResponse::NoOpinion`], leaving access logic to the handler.
///
/// Configured actions are still reported through `required_actions`, so the
/// dispatch log shows what the handler is expected to enforce itself.
#[derive(Debug, Clone, Default)]
pub struct OpenGuard {
    actions: ActionList,
}

impl OpenGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, actions: impl Into<ActionList>) -> Self {
        self.actions = actions.into();
        self
    }
}

impl AccessGuard for OpenGuard {
    type Target = ();

    fn required_actions(&self) -> &ActionList {
        &self.actions
    }

    fn check_access(&self, _request: &RequestContext) -> Result<Checked<()>> {
        Ok(Checked {
            response: AccessResponse::NoOpinion,
            target: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Entity Guard
// ═══════════════════════════════════════════════════════════════════════════════

/// Guard bound to entity type `E`.
///
/// Locates the addressed record through `S`, falling back to `E::default()`
/// when the request addresses none, and asks it which required actions the
/// requesting user is denied.
pub struct EntityGuard<E, S> {
    store: S,
    actions: ActionList,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S> EntityGuard<E, S>
where
    E: Secured,
    S: EntityStore<E>,
{
    /// A guard with no required actions; every request is granted until
    /// [`require`](Self::require) configures some.
    pub fn new(store: S) -> Self {
        Self {
            store,
            actions: ActionList::new(),
            _entity: PhantomData,
        }
    }

    pub fn require(mut self, actions: impl Into<ActionList>) -> Self {
        self.actions = actions.into();
        self
    }
}

impl<E, S> AccessGuard for EntityGuard<E, S>
where
    E: Secured,
    S: EntityStore<E>,
{
    type Target = E;

    fn required_actions(&self) -> &ActionList {
        &self.actions
    }

    fn check_access(&self, request: &RequestContext) -> Result<Checked<E>> {
        let target = self.store.locate(request.params())?;
        let denied = match &target {
            Some(entity) => entity.check_access(&self.actions, request.user(), request.context())?,
            None => E::check_type_access(&self.actions, request.user(), request.context())?,
        };

        Ok(Checked {
            response: AccessResponse::from_denied(denied),
            target,
        })
    }
}

impl<E, S: std::fmt::Debug> std::fmt::Debug for EntityGuard<E, S>
where
    E: Secured,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityGuard")
            .field("entity", &E::KIND)
            .field("store", &self.store)
            .field("actions", &self.actions)
            .finish()
    }
}
