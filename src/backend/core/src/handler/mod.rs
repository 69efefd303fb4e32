//! Access-gated request handling.
//!
//! A [`GatedHandler`] composes three pieces:
//! - an [`AccessGuard`] that evaluates the request before any work is done
//!   ([`EntityGuard`] for handlers bound to an entity type, [`OpenGuard`]
//!   for handlers that do their own checks)
//! - the wrapped [`Handler`], run only when access is granted
//! - a [`DenialResponder`] producing the refusal ([`Forbid`] by default)
//!
//! # Usage
//!
//! ```rust,ignore
//! use portcullis_core::handler::{EntityGuard, GatedHandler, RequestContext};
//!
//! let edit_article = GatedHandler::new(
//!     EntityGuard::new(articles.clone()).require("edit"),
//!     |request: &RequestContext, article: Option<Article>| { /* ... */ },
//! );
//!
//! let output = edit_article.dispatch(&request)?;
//! ```

pub mod gated;
pub mod guard;
pub mod request;
pub mod store;

pub use gated::{DenialResponder, Forbid, GatedHandler, Handler};
pub use guard::{AccessGuard, Checked, EntityGuard, OpenGuard};
pub use request::{RequestContext, RouteParams};
pub use store::{EntityStore, InMemoryStore};
