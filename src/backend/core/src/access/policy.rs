//! Per-entity predicate tables and the access check that evaluates them.
//!
//! Each secured entity type builds one [`AccessPolicy`] mapping action names
//! to predicates. Checking a list of actions resolves every action against
//! the table first and then evaluates the predicates in order, collecting the
//! actions whose predicate answered `false`.

use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use super::action::{Action, ActionList};
use super::context::AccessContext;
use super::error::{AccessError, PredicateError};
use crate::identity::User;

type InstanceFn<E> =
    Box<dyn Fn(&E, &User, &AccessContext) -> Result<bool, PredicateError> + Send + Sync>;
type ClassFn = Box<dyn Fn(&User, &AccessContext) -> Result<bool, PredicateError> + Send + Sync>;

/// A registered predicate.
enum Predicate<E> {
    /// Reads the entity instance.
    Instance(InstanceFn<E>),
    /// Answers for the entity type as a whole and never sees an instance.
    Class(ClassFn),
}

impl<E> Predicate<E> {
    fn evaluate(
        &self,
        entity: &E,
        user: &User,
        context: &AccessContext,
    ) -> Result<bool, PredicateError> {
        match self {
            Self::Instance(f) => f(entity, user, context),
            Self::Class(f) => f(user, context),
        }
    }

    fn scope(&self) -> &'static str {
        match self {
            Self::Instance(_) => "instance",
            Self::Class(_) => "class",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Access Policy
// ═══════════════════════════════════════════════════════════════════════════════

/// Table of `{action → predicate}` for one entity type.
pub struct AccessPolicy<E> {
    entity: &'static str,
    predicates: HashMap<Action, Predicate<E>>,
}

impl<E> AccessPolicy<E> {
    /// Create an empty table for the entity type named `entity`.
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            predicates: HashMap::new(),
        }
    }

    /// Register a predicate that inspects the entity instance.
    pub fn instance<F>(self, action: impl Into<Action>, predicate: F) -> Self
    where
        F: Fn(&E, &User, &AccessContext) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        self.register(action.into(), Predicate::Instance(Box::new(predicate)))
    }

    /// Register a type-level predicate.
    ///
    /// Creation checks run against an empty instance because no record exists
    /// yet. Registering them here keeps them from reading instance fields.
    pub fn class<F>(self, action: impl Into<Action>, predicate: F) -> Self
    where
        F: Fn(&User, &AccessContext) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        self.register(action.into(), Predicate::Class(Box::new(predicate)))
    }

    fn register(mut self, action: Action, predicate: Predicate<E>) -> Self {
        if self.predicates.contains_key(&action) {
            warn!(entity = self.entity, action = %action, "Replacing registered predicate");
        }
        self.predicates.insert(action, predicate);
        self
    }

    /// Name of the entity type this table belongs to.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn supports(&self, action: &Action) -> bool {
        self.predicates.contains_key(action)
    }

    /// Registered actions, sorted by name.
    pub fn actions(&self) -> Vec<&Action> {
        let mut actions: Vec<&Action> = self.predicates.keys().collect();
        actions.sort();
        actions
    }

    /// Evaluate `actions` against `entity` for `user`.
    ///
    /// Returns the denied actions in input order; an empty result means every
    /// action is permitted. Every action is resolved before any predicate
    /// runs, so an unknown action fails the whole check.
    pub fn check(
        &self,
        entity: &E,
        actions: &ActionList,
        user: &User,
        context: &AccessContext,
    ) -> Result<Vec<Action>, AccessError> {
        let resolved = actions
            .iter()
            .map(|action| {
                self.predicates
                    .get(action)
                    .map(|predicate| (action, predicate))
                    .ok_or_else(|| AccessError::UnknownAction {
                        entity: self.entity,
                        action: action.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut denied = Vec::new();
        for (action, predicate) in resolved {
            let allowed = predicate
                .evaluate(entity, user, context)
                .map_err(|source| AccessError::Predicate {
                    entity: self.entity,
                    action: action.clone(),
                    source,
                })?;

            debug!(
                entity = self.entity,
                action = %action,
                scope = predicate.scope(),
                user = %user,
                allowed,
                "Evaluated predicate"
            );

            if !allowed {
                denied.push(action.clone());
            }
        }

        Ok(denied)
    }
}

impl<E> fmt::Debug for AccessPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessPolicy")
            .field("entity", &self.entity)
            .field("actions", &self.actions())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Secured Entities
// ═══════════════════════════════════════════════════════════════════════════════

/// An entity type whose instances can be asked which actions a user may
/// perform on them.
///
/// `Default` must produce the empty instance used when a request addresses no
/// existing record. Predicates that may run against it (creation checks)
/// belong in [`AccessPolicy::class`].
pub trait Secured: Default + Send + Sync + Sized + 'static {
    /// Entity type name used in logs and errors.
    const KIND: &'static str;

    /// The predicate table for this type, built once.
    fn access_policy() -> &'static AccessPolicy<Self>;

    /// Denied actions among `actions` for `user`, in input order.
    fn check_access(
        &self,
        actions: impl Into<ActionList>,
        user: &User,
        context: &AccessContext,
    ) -> Result<Vec<Action>, AccessError> {
        Self::access_policy().check(self, &actions.into(), user, context)
    }

    /// Same as [`check_access`](Self::check_access) against an empty instance.
    fn check_type_access(
        actions: impl Into<ActionList>,
        user: &User,
        context: &AccessContext,
    ) -> Result<Vec<Action>, AccessError> {
        Self::default().check_access(actions, user, context)
    }
}
