//! Integration tests for access checks and gated dispatch.
//!
//! Tests cover:
//! - Denial sets: ordering, empty lists, bare names, determinism
//! - Unknown actions versus denials
//! - Predicate failures and context forwarding
//! - Grant reduction of access responses
//! - Gated create and edit flows over the blog entities

use portcullis_core::blog::{Article, Comment};
use portcullis_core::error::ErrorCode;
use portcullis_core::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

// ============================================================================
// Fixtures
// ============================================================================

fn alice_article() -> Article {
    Article::new(UserId::new("alice"), "Title", "Body")
}

/// An entity whose `archive` predicate needs a `quota` context value.
#[derive(Debug, Clone, Default)]
struct Folder {
    owner: Option<UserId>,
}

impl Secured for Folder {
    const KIND: &'static str = "folder";

    fn access_policy() -> &'static AccessPolicy<Self> {
        static POLICY: OnceLock<AccessPolicy<Folder>> = OnceLock::new();
        POLICY.get_or_init(|| {
            AccessPolicy::new(Self::KIND)
                .instance("read", |folder: &Folder, user, _| Ok(user.is(folder.owner.as_ref())))
                .instance("archive", |_: &Folder, _, context| {
                    let quota: u32 = context
                        .decode("quota")?
                        .ok_or(PredicateError::MissingRelation("quota"))?;
                    Ok(quota > 0)
                })
        })
    }
}

// ============================================================================
// Denial Set Tests
// ============================================================================

#[test]
fn test_denials_are_ordered_subsequence() {
    let article = alice_article();
    let bob = User::new("bob");
    let ctx = AccessContext::new();

    let denied = article
        .check_access(["delete", "read", "edit"], &bob, &ctx)
        .unwrap();
    assert_eq!(denied, vec![Action::DELETE, Action::EDIT]);

    let denied = article
        .check_access(["edit", "read", "delete"], &bob, &ctx)
        .unwrap();
    assert_eq!(denied, vec![Action::EDIT, Action::DELETE]);
}

#[test]
fn test_empty_action_list_is_granted() {
    let article = alice_article();
    let denied = article
        .check_access(ActionList::new(), &User::anonymous(), &AccessContext::new())
        .unwrap();
    assert!(denied.is_empty());
}

#[test]
fn test_bare_action_matches_single_element_list() {
    let article = alice_article();
    let bob = User::new("bob");
    let ctx = AccessContext::new();

    assert_eq!(
        article.check_access("edit", &bob, &ctx).unwrap(),
        article.check_access(["edit"], &bob, &ctx).unwrap()
    );
}

#[test]
fn test_repeated_checks_are_deterministic() {
    let article = alice_article();
    let bob = User::new("bob");
    let ctx = AccessContext::new();

    let first = article.check_access(["edit", "delete"], &bob, &ctx).unwrap();
    let second = article.check_access(["edit", "delete"], &bob, &ctx).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_checks_see_current_state() {
    let mut article = alice_article();
    let alice = User::new("alice");
    let ctx = AccessContext::new();

    assert!(article.check_access("delete", &alice, &ctx).unwrap().is_empty());
    article.comment_count += 1;
    assert_eq!(
        article.check_access("delete", &alice, &ctx).unwrap(),
        vec![Action::DELETE]
    );
}

// ============================================================================
// Misconfiguration and Predicate Failure Tests
// ============================================================================

#[test]
fn test_unknown_action_is_distinct_from_denial() {
    let article = alice_article();
    let err = article
        .check_access(["read", "publish"], &User::new("alice"), &AccessContext::new())
        .unwrap_err();

    assert!(err.is_misconfiguration());
    assert_eq!(err.action().as_str(), "publish");

    let err: PortcullisError = err.into();
    assert_eq!(err.code(), ErrorCode::MisconfiguredAction);
    assert!(!err.is_forbidden());
}

#[test]
fn test_unknown_action_raised_even_when_others_deny() {
    let comment = Comment::default();
    let err = comment
        .check_access(["delete", "pin"], &User::anonymous(), &AccessContext::new())
        .unwrap_err();
    assert!(err.is_misconfiguration());
}

#[test]
fn test_predicate_failure_propagates() {
    let folder = Folder::default();
    let err = folder
        .check_access("archive", &User::new("alice"), &AccessContext::new())
        .unwrap_err();

    assert!(!err.is_misconfiguration());
    let err: PortcullisError = err.into();
    assert_eq!(err.code(), ErrorCode::PredicateFailed);
}

#[test]
fn test_context_forwarded_to_predicates() {
    let folder = Folder::default();
    let user = User::new("alice");

    let granted = AccessContext::new().with("quota", 3);
    assert!(folder.check_access("archive", &user, &granted).unwrap().is_empty());

    let exhausted = AccessContext::new().with("quota", 0);
    assert_eq!(
        folder.check_access("archive", &user, &exhausted).unwrap(),
        vec![Action::new("archive")]
    );
}

// ============================================================================
// Grant Reduction Tests
// ============================================================================

#[test]
fn test_grant_reduction() {
    assert!(AccessResponse::NoOpinion.is_granted());
    assert!(AccessResponse::Granted.is_granted());
    assert!(AccessResponse::from(true).is_granted());
    assert!(AccessResponse::from(Vec::<Action>::new()).is_granted());
    assert!(!AccessResponse::from(vec![Action::new("x")]).is_granted());
    assert!(!AccessResponse::from(false).is_granted());
    assert!(!AccessResponse::Denied(Vec::new()).is_granted());
}

// ============================================================================
// Gated Dispatch Tests
// ============================================================================

#[test]
fn test_gated_create_refuses_non_author_without_dispatching() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let gated = GatedHandler::new(
        EntityGuard::new(InMemoryStore::<Article>::new()).require(Action::CREATE),
        move |_: &RequestContext, _: Option<Article>| -> Result<()> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    );

    let reader = RequestContext::new(User::new("bob"));
    let err = gated.dispatch(&reader).unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let author = RequestContext::new(User::new("alice").with_staff(Staff::author()));
    gated.dispatch(&author).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_gated_edit_by_author_returns_handler_result() {
    let store = Arc::new(InMemoryStore::new());
    let article = alice_article();
    store.insert(article.id, article.clone());

    let gated = GatedHandler::new(
        EntityGuard::new(store.clone()).require("edit"),
        |_: &RequestContext, target: Option<Article>| -> Result<Option<Article>> { Ok(target) },
    );

    let request = RequestContext::new(User::new("alice")).with_param("id", article.id.to_string());
    assert_eq!(gated.dispatch(&request).unwrap(), Some(article));
}

#[test]
fn test_gated_handler_on_missing_record() {
    let gated = GatedHandler::new(
        EntityGuard::new(InMemoryStore::<Comment>::new()).require("read"),
        |_: &RequestContext, _: Option<Comment>| -> Result<()> { Ok(()) },
    );

    let request = RequestContext::new(User::anonymous()).with_param("id", Uuid::new_v4().to_string());
    assert_eq!(gated.dispatch(&request).unwrap_err().code(), ErrorCode::RecordNotFound);
}

#[test]
fn test_guard_reports_denials_to_custom_responder() {
    struct ListDenied;

    impl DenialResponder<Vec<String>> for ListDenied {
        fn access_denied(
            &self,
            response: &AccessResponse,
            _request: &RequestContext,
        ) -> Result<Vec<String>> {
            Ok(response.denied().iter().map(|a| a.to_string()).collect())
        }
    }

    let store = InMemoryStore::new();
    let article = alice_article();
    store.insert(article.id, article.clone());

    let gated = GatedHandler::new(
        EntityGuard::new(store).require(["read", "edit", "delete"]),
        |_: &RequestContext, _: Option<Article>| -> Result<Vec<String>> { Ok(Vec::new()) },
    )
    .with_responder(ListDenied);

    let request = RequestContext::new(User::new("bob")).with_param("id", article.id.to_string());
    assert_eq!(gated.dispatch(&request).unwrap(), vec!["edit", "delete"]);
}
