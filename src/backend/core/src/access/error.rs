//! Errors raised while evaluating access checks.
//!
//! A denied action is not an error: it is reported as data in the denial set.
//! These types cover the two ways a check can fail to produce a decision.

use thiserror::Error;

use super::action::Action;

/// Failure raised by an individual predicate.
///
/// The access layer never swallows these; they reach the caller inside
/// [`AccessError::Predicate`] with the original error as the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    #[error("related record not available: {0}")]
    MissingRelation(&'static str),

    #[error("invalid context value for '{key}': {reason}")]
    InvalidContext { key: String, reason: String },

    #[error("{0}")]
    Failed(String),
}

/// Errors from [`Secured::check_access`](super::Secured::check_access).
#[derive(Debug, Error)]
pub enum AccessError {
    /// The entity type registers no predicate for the action. This is a
    /// wiring mistake, never an access decision.
    #[error("{entity} has no predicate for action '{action}'")]
    UnknownAction { entity: &'static str, action: Action },

    /// A predicate failed instead of answering.
    #[error("{entity} predicate for '{action}' failed")]
    Predicate {
        entity: &'static str,
        action: Action,
        #[source]
        source: PredicateError,
    },
}

impl AccessError {
    /// True for configuration mistakes as opposed to runtime failures.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, Self::UnknownAction { .. })
    }

    pub fn action(&self) -> &Action {
        match self {
            Self::UnknownAction { action, .. } | Self::Predicate { action, .. } => action,
        }
    }
}
