use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::access::{AccessPolicy, Secured};
use crate::identity::UserId;

/// A reader's reply to an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub article_id: Uuid,
    pub author: Option<UserId>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(article_id: Uuid, author: UserId, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            article_id,
            author: Some(author),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

impl Secured for Comment {
    const KIND: &'static str = "comment";

    fn access_policy() -> &'static AccessPolicy<Self> {
        static POLICY: OnceLock<AccessPolicy<Comment>> = OnceLock::new();
        POLICY.get_or_init(|| {
            AccessPolicy::new(Self::KIND)
                .class("create", |user, _| Ok(user.is_authenticated()))
                .class("read", |_, _| Ok(true))
                .instance("edit", |comment: &Comment, user, _| {
                    Ok(user.is(comment.author.as_ref()) || user.has_staff(|s| s.moderator))
                })
                .class("delete", |user, _| Ok(user.has_staff(|s| s.moderator)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessContext, Action};
    use crate::identity::{Staff, User};

    fn comment_by(author: &str) -> Comment {
        Comment::new(Uuid::new_v4(), UserId::new(author), "Nice post")
    }

    #[test]
    fn test_create_requires_authentication() {
        let ctx = AccessContext::new();
        assert!(Comment::check_type_access("create", &User::new("bob"), &ctx)
            .unwrap()
            .is_empty());
        assert_eq!(
            Comment::check_type_access("create", &User::anonymous(), &ctx).unwrap(),
            vec![Action::CREATE]
        );
    }

    #[test]
    fn test_everyone_reads() {
        let comment = comment_by("bob");
        let denied = comment
            .check_access("read", &User::anonymous(), &AccessContext::new())
            .unwrap();
        assert!(denied.is_empty());
    }

    #[test]
    fn test_edit_by_author_or_moderator() {
        let comment = comment_by("bob");
        let ctx = AccessContext::new();
        let moderator = User::new("mod").with_staff(Staff::moderator());

        assert!(comment.check_access("edit", &User::new("bob"), &ctx).unwrap().is_empty());
        assert!(comment.check_access("edit", &moderator, &ctx).unwrap().is_empty());
        assert_eq!(
            comment.check_access("edit", &User::new("carol"), &ctx).unwrap(),
            vec![Action::EDIT]
        );
    }

    #[test]
    fn test_only_moderators_delete() {
        let comment = comment_by("bob");
        let ctx = AccessContext::new();
        let moderator = User::new("mod").with_staff(Staff::moderator());

        assert!(comment.check_access("delete", &moderator, &ctx).unwrap().is_empty());
        assert_eq!(
            comment.check_access(["edit", "delete"], &User::new("bob"), &ctx).unwrap(),
            vec![Action::DELETE]
        );
    }
}
