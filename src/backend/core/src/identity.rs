//! Requesting identities: users and their staff capability records.
//!
//! The access layer never owns users. Handlers receive a [`User`] from the
//! identity collaborator (see [`UserDirectory`]) and predicates consult only
//! its identity, its authentication status, and the optional [`Staff`] record.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Staff
// ═══════════════════════════════════════════════════════════════════════════════

/// Editorial capabilities attached to a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    /// May write new articles.
    #[serde(default)]
    pub author: bool,
    /// May edit any article.
    #[serde(default)]
    pub editor: bool,
    /// May edit and remove any comment.
    #[serde(default)]
    pub moderator: bool,
}

impl Staff {
    pub fn author() -> Self {
        Self {
            author: true,
            ..Default::default()
        }
    }

    pub fn editor() -> Self {
        Self {
            editor: true,
            ..Default::default()
        }
    }

    pub fn moderator() -> Self {
        Self {
            moderator: true,
            ..Default::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// User
// ═══════════════════════════════════════════════════════════════════════════════

/// The identity a request is made on behalf of.
///
/// Two users are equal when their ids are equal; anonymous users carry no id
/// and are never equal to anyone, including each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: Option<UserId>,
    #[serde(default)]
    staff: Option<Staff>,
}

impl User {
    /// An authenticated user without a staff record.
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: Some(id.into()),
            staff: None,
        }
    }

    /// The unauthenticated visitor.
    pub fn anonymous() -> Self {
        Self {
            id: None,
            staff: None,
        }
    }

    pub fn with_staff(mut self, staff: Staff) -> Self {
        self.staff = Some(staff);
        self
    }

    pub fn id(&self) -> Option<&UserId> {
        self.id.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }

    pub fn staff(&self) -> Option<&Staff> {
        self.staff.as_ref()
    }

    /// True when `id` names this user.
    pub fn is(&self, id: Option<&UserId>) -> bool {
        matches!((self.id.as_ref(), id), (Some(a), Some(b)) if a == b)
    }

    /// Whether the staff record grants `flag`; users without one have none.
    pub fn has_staff(&self, flag: impl Fn(&Staff) -> bool) -> bool {
        self.staff.as_ref().is_some_and(flag)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.is(other.id.as_ref())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}", id),
            None => write!(f, "anonymous"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// User Directory
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory lookup from user id to [`User`], standing in for the identity
/// collaborator in the HTTP service.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user, replacing any previous entry with the same id.
    /// Anonymous users are ignored.
    pub fn insert(&self, user: User) {
        if let Some(id) = user.id.clone() {
            self.users.write().insert(id, user);
        }
    }

    /// Resolve an id. Unknown ids resolve to an anonymous user.
    pub fn resolve(&self, id: Option<&str>) -> User {
        id.and_then(|id| self.users.read().get(&UserId::new(id)).cloned())
            .unwrap_or_else(User::anonymous)
    }
}
