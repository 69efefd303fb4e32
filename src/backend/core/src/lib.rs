#![allow(clippy::result_large_err)]
//! # Portcullis Core
//!
//! Per-entity action predicates and access-gated request handlers.
//!
//! ## Architecture
//!
//! - **Access**: Entity types declare one predicate per action in an
//!   [`AccessPolicy`](access::AccessPolicy); `check_access` returns the
//!   actions the user is denied, in request order
//! - **Handler**: A [`GatedHandler`](handler::GatedHandler) locates the
//!   addressed record, checks the required actions, then dispatches or refuses
//! - **Identity**: Users, staff capability flags and the user directory
//! - **Blog**: Articles and comments with their access rules
//! - **API**: Axum service exposing the blog through gated handlers
//! - **Telemetry**: Structured logging for access decisions

pub mod access;
pub mod api;
pub mod blog;
pub mod config;
pub mod error;
pub mod handler;
pub mod identity;
pub mod telemetry;

pub use error::{ErrorCode, ErrorDetails, ErrorSeverity, PortcullisError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::access::{
        AccessContext, AccessError, AccessPolicy, AccessResponse, Action, ActionList,
        PredicateError, Secured,
    };
    pub use crate::error::{ErrorCode, PortcullisError, Result};
    pub use crate::handler::{
        AccessGuard, Checked, DenialResponder, EntityGuard, EntityStore, Forbid, GatedHandler,
        Handler, InMemoryStore, OpenGuard, RequestContext, RouteParams,
    };
    pub use crate::identity::{Staff, User, UserDirectory, UserId};
}
