//! Access checks for secured entities.
//!
//! This module provides:
//! - **Actions**: named operations (`create`, `read`, `edit`, `delete`) and
//!   ordered lists of them
//! - **Policies**: a per-entity table from action to predicate
//! - **Secured**: the trait entity types implement to answer "which of these
//!   actions is this user denied?"
//! - **Responses**: the three-way answer a guard gives before dispatch
//!
//! # Usage
//!
//! ```rust,ignore
//! use portcullis_core::access::{AccessContext, Secured};
//!
//! let denied = article.check_access(["read", "edit"], &user, &AccessContext::new())?;
//! if denied.is_empty() {
//!     // every action permitted
//! }
//! ```

pub mod action;
pub mod context;
pub mod error;
pub mod policy;
pub mod response;

pub use action::{Action, ActionList};
pub use context::AccessContext;
pub use error::{AccessError, PredicateError};
pub use policy::{AccessPolicy, Secured};
pub use response::AccessResponse;
