//! Action names and the ordered lists handlers and callers check.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Symbolic name of an operation subject to access control.
///
/// The well-known actions are provided as constants; any other name may be
/// used as long as the checked entity type registers a predicate for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
    pub const CREATE: Action = Action::from_static("create");
    pub const READ: Action = Action::from_static("read");
    pub const EDIT: Action = Action::from_static("edit");
    pub const DELETE: Action = Action::from_static("delete");

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Action {
    fn from(s: &'static str) -> Self {
        Self::from_static(s)
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl PartialEq<str> for Action {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Action {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// An ordered list of actions to check.
///
/// A single bare action converts into a one-element list, so callers may pass
/// either `"edit"` or `["read", "edit"]` wherever an `impl Into<ActionList>`
/// is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionList(Vec<Action>);

impl ActionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Action> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ActionList {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Action> for ActionList {
    fn from(action: Action) -> Self {
        Self(vec![action])
    }
}

impl From<&'static str> for ActionList {
    fn from(name: &'static str) -> Self {
        Self(vec![Action::from(name)])
    }
}

impl From<Vec<Action>> for ActionList {
    fn from(actions: Vec<Action>) -> Self {
        Self(actions)
    }
}

impl From<&[Action]> for ActionList {
    fn from(actions: &[Action]) -> Self {
        Self(actions.to_vec())
    }
}

impl From<&ActionList> for ActionList {
    fn from(actions: &ActionList) -> Self {
        actions.clone()
    }
}

impl From<Vec<&'static str>> for ActionList {
    fn from(names: Vec<&'static str>) -> Self {
        Self(names.into_iter().map(Action::from).collect())
    }
}

impl<const N: usize> From<[&'static str; N]> for ActionList {
    fn from(names: [&'static str; N]) -> Self {
        Self(names.into_iter().map(Action::from).collect())
    }
}

impl<const N: usize> From<[Action; N]> for ActionList {
    fn from(actions: [Action; N]) -> Self {
        Self(actions.into())
    }
}

impl FromIterator<Action> for ActionList {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
