//! The answer a guard gives before dispatch, and its reduction to grant/deny.

use serde::{Deserialize, Serialize};

use super::action::Action;

/// Outcome of a guard's access check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "denied", rename_all = "snake_case")]
pub enum AccessResponse {
    /// The guard has no opinion; handlers doing their own checks use this.
    #[default]
    NoOpinion,
    /// Every required action is permitted.
    Granted,
    /// Access refused. Carries the denied actions, which may be empty when
    /// the refusal has no per-action breakdown.
    Denied(Vec<Action>),
}

impl AccessResponse {
    /// Build a response from a denial set: empty grants, anything else denies.
    pub fn from_denied(denied: Vec<Action>) -> Self {
        if denied.is_empty() {
            Self::Granted
        } else {
            Self::Denied(denied)
        }
    }

    /// Reduce to a single decision. Only an explicit denial refuses access.
    pub fn is_granted(&self) -> bool {
        match self {
            Self::NoOpinion | Self::Granted => true,
            Self::Denied(_) => false,
        }
    }

    /// The denied actions, empty unless this is a denial.
    pub fn denied(&self) -> &[Action] {
        match self {
            Self::Denied(actions) => actions,
            Self::NoOpinion | Self::Granted => &[],
        }
    }
}

impl From<bool> for AccessResponse {
    fn from(granted: bool) -> Self {
        if granted {
            Self::Granted
        } else {
            Self::Denied(Vec::new())
        }
    }
}

impl From<Vec<Action>> for AccessResponse {
    fn from(denied: Vec<Action>) -> Self {
        Self::from_denied(denied)
    }
}

impl From<Option<Vec<Action>>> for AccessResponse {
    fn from(denied: Option<Vec<Action>>) -> Self {
        denied.map_or(Self::NoOpinion, Self::from_denied)
    }
}
