//! Access-gated dispatch: guard first, then the wrapped handler.
//!
//! ```text
//! Start → CheckingAccess ─┬─ granted → Dispatching → Done
//!                         └─ denied  → DeniedResponse → Done
//! ```

use tracing::{debug, warn};

use super::guard::{AccessGuard, Checked};
use super::request::RequestContext;
use crate::access::AccessResponse;
use crate::error::{PortcullisError, Result};

/// The logic a gated handler runs once access is granted.
///
/// `target` is the existing record the guard located, if any.
pub trait Handler<T>: Send + Sync {
    type Output;

    fn handle(&self, request: &RequestContext, target: Option<T>) -> Result<Self::Output>;
}

impl<T, O, F> Handler<T> for F
where
    F: Fn(&RequestContext, Option<T>) -> Result<O> + Send + Sync,
{
    type Output = O;

    fn handle(&self, request: &RequestContext, target: Option<T>) -> Result<O> {
        self(request, target)
    }
}

/// Produces the outcome of a refused request.
pub trait DenialResponder<O>: Send + Sync {
    fn access_denied(&self, response: &AccessResponse, request: &RequestContext) -> Result<O>;
}

/// Default responder: fails with [`PortcullisError::forbidden`], leaving the
/// host to render its standard denial.
#[derive(Debug, Clone, Copy, Default)]
pub struct Forbid;

impl<O> DenialResponder<O> for Forbid {
    fn access_denied(&self, _response: &AccessResponse, _request: &RequestContext) -> Result<O> {
        Err(PortcullisError::forbidden())
    }
}

/// A handler wrapped by an access guard.
#[derive(Debug, Clone)]
pub struct GatedHandler<G, H, D = Forbid> {
    guard: G,
    handler: H,
    responder: D,
}

impl<G, H> GatedHandler<G, H, Forbid> {
    pub fn new(guard: G, handler: H) -> Self {
        Self {
            guard,
            handler,
            responder: Forbid,
        }
    }
}

impl<G, H, D> GatedHandler<G, H, D> {
    /// Replace how refusals are answered (redirects, custom messages).
    pub fn with_responder<R>(self, responder: R) -> GatedHandler<G, H, R> {
        GatedHandler {
            guard: self.guard,
            handler: self.handler,
            responder,
        }
    }

    pub fn guard(&self) -> &G {
        &self.guard
    }
}

impl<G, H, D> GatedHandler<G, H, D>
where
    G: AccessGuard,
    H: Handler<G::Target>,
    D: DenialResponder<H::Output>,
{
    /// Check access once, then either run the wrapped handler and return its
    /// result unchanged, or return the responder's denial outcome.
    pub fn dispatch(&self, request: &RequestContext) -> Result<H::Output> {
        let Checked { response, target } = self.guard.check_access(request)?;

        if !self.guard.grant_access(&response) {
            warn!(
                request_id = %request.request_id(),
                user = %request.user(),
                required = ?self.guard.required_actions(),
                denied = ?response.denied(),
                "Access denied"
            );
            return self.responder.access_denied(&response, request);
        }

        debug!(
            request_id = %request.request_id(),
            user = %request.user(),
            required = ?self.guard.required_actions(),
            "Access granted"
        );
        self.handler.handle(request, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessPolicy, Action, ActionList, Secured};
    use crate::error::ErrorCode;
    use crate::handler::guard::{EntityGuard, OpenGuard};
    use crate::handler::store::InMemoryStore;
    use crate::identity::{Staff, User, UserId};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, OnceLock};
    use uuid::Uuid;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Post {
        author: Option<UserId>,
        body: String,
    }

    impl Secured for Post {
        const KIND: &'static str = "post";

        fn access_policy() -> &'static AccessPolicy<Self> {
            static POLICY: OnceLock<AccessPolicy<Post>> = OnceLock::new();
            POLICY.get_or_init(|| {
                AccessPolicy::new(Self::KIND)
                    .class("create", |user, _| Ok(user.has_staff(|s| s.author)))
                    .instance("edit", |post: &Post, user, _| Ok(user.is(post.author.as_ref())))
            })
        }
    }

    fn seeded() -> (InMemoryStore<Post>, Uuid) {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        store.insert(
            id,
            Post {
                author: Some(UserId::new("alice")),
                body: "hello".to_string(),
            },
        );
        (store, id)
    }

    #[test]
    fn test_create_denied_without_running_handler() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let gated = GatedHandler::new(
            EntityGuard::new(InMemoryStore::<Post>::new()).require("create"),
            move |_: &RequestContext, _: Option<Post>| -> Result<&'static str> {
                flag.store(true, Ordering::SeqCst);
                Ok("created")
            },
        );

        let reader = User::new("bob").with_staff(Staff::default());
        let err = gated.dispatch(&RequestContext::new(reader)).unwrap_err();

        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_create_granted_for_staff_author() {
        let gated = GatedHandler::new(
            EntityGuard::new(InMemoryStore::<Post>::new()).require("create"),
            |_: &RequestContext, target: Option<Post>| -> Result<bool> { Ok(target.is_none()) },
        );

        let author = User::new("alice").with_staff(Staff::author());
        assert!(gated.dispatch(&RequestContext::new(author)).unwrap());
    }

    #[test]
    fn test_edit_by_author_returns_handler_result_unchanged() {
        let (store, id) = seeded();
        let gated = GatedHandler::new(
            EntityGuard::new(store).require([Action::EDIT]),
            |_: &RequestContext, target: Option<Post>| -> Result<String> {
                Ok(target.map(|p| p.body).unwrap_or_default())
            },
        );

        let request = RequestContext::new(User::new("alice")).with_param("id", id.to_string());
        assert_eq!(gated.dispatch(&request).unwrap(), "hello");
    }

    #[test]
    fn test_edit_by_stranger_forbidden() {
        let (store, id) = seeded();
        let gated = GatedHandler::new(
            EntityGuard::new(store).require("edit"),
            |_: &RequestContext, _: Option<Post>| -> Result<()> { Ok(()) },
        );

        let request = RequestContext::new(User::new("mallory")).with_param("id", id.to_string());
        assert!(gated.dispatch(&request).unwrap_err().is_forbidden());
    }

    #[test]
    fn test_unknown_required_action_is_misconfiguration() {
        let (store, id) = seeded();
        let gated = GatedHandler::new(
            EntityGuard::new(store).require(["edit", "publish"]),
            |_: &RequestContext, _: Option<Post>| -> Result<()> { Ok(()) },
        );

        let request = RequestContext::new(User::new("alice")).with_param("id", id.to_string());
        let err = gated.dispatch(&request).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MisconfiguredAction);
    }

    #[test]
    fn test_missing_record_propagates_not_found() {
        let (store, _) = seeded();
        let gated = GatedHandler::new(
            EntityGuard::new(store).require("edit"),
            |_: &RequestContext, _: Option<Post>| -> Result<()> { Ok(()) },
        );

        let request =
            RequestContext::new(User::new("alice")).with_param("id", Uuid::new_v4().to_string());
        assert_eq!(gated.dispatch(&request).unwrap_err().code(), ErrorCode::RecordNotFound);
    }

    #[test]
    fn test_no_required_actions_grants() {
        let (store, id) = seeded();
        let gated = GatedHandler::new(
            EntityGuard::new(store),
            |_: &RequestContext, target: Option<Post>| -> Result<bool> { Ok(target.is_some()) },
        );

        let request = RequestContext::new(User::anonymous()).with_param("id", id.to_string());
        assert!(gated.dispatch(&request).unwrap());
    }

    #[test]
    fn test_open_guard_has_no_opinion() {
        let gated = GatedHandler::new(OpenGuard::new(), |_: &RequestContext, _: Option<()>| -> Result<u32> {
            Ok(7)
        });
        assert!(gated.guard().required_actions().is_empty());
        assert_eq!(gated.dispatch(&RequestContext::new(User::anonymous())).unwrap(), 7);
    }

    #[test]
    fn test_open_guard_reports_actions_without_checking() {
        let gated = GatedHandler::new(
            OpenGuard::new().require(["publish", "archive"]),
            |_: &RequestContext, _: Option<()>| -> Result<u32> { Ok(9) },
        );
        assert_eq!(
            gated.guard().required_actions(),
            &ActionList::from(["publish", "archive"])
        );
        assert_eq!(gated.dispatch(&RequestContext::new(User::anonymous())).unwrap(), 9);
    }

    struct Explain;

    impl DenialResponder<String> for Explain {
        fn access_denied(&self, response: &AccessResponse, _request: &RequestContext) -> Result<String> {
            let names: Vec<&str> = response.denied().iter().map(Action::as_str).collect();
            Ok(format!("cannot {}", names.join(", ")))
        }
    }

    #[test]
    fn test_custom_responder_uses_denial_payload() {
        let (store, id) = seeded();
        let gated = GatedHandler::new(
            EntityGuard::new(store).require("edit"),
            |_: &RequestContext, _: Option<Post>| -> Result<String> { Ok("edited".to_string()) },
        )
        .with_responder(Explain);

        let request = RequestContext::new(User::new("bob")).with_param("id", id.to_string());
        assert_eq!(gated.dispatch(&request).unwrap(), "cannot edit");
    }

    #[derive(Default)]
    struct Strict {
        actions: ActionList,
    }

    impl AccessGuard for Strict {
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

        fn grant_access(&self, response: &AccessResponse) -> bool {
            matches!(response, AccessResponse::Granted)
        }
    }

    #[test]
    fn test_guard_may_override_grant_reduction() {
        let gated = GatedHandler::new(Strict::default(), |_: &RequestContext, _: Option<()>| -> Result<()> {
            Ok(())
        });
        let err = gated.dispatch(&RequestContext::new(User::anonymous())).unwrap_err();
        assert!(err.is_forbidden());
    }
}
