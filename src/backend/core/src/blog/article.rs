use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::access::{AccessPolicy, Secured};
use crate::identity::UserId;

/// A published piece of writing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub author: Option<UserId>,
    pub title: String,
    pub text: String,
    /// Hidden from anonymous visitors when set.
    pub registered_only: bool,
    /// Number of comments attached; maintained by whoever stores comments.
    pub comment_count: usize,
    pub created_at: DateTime<Utc>,
}

impl Article {
    pub fn new(author: UserId, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: Some(author),
            title: title.into(),
            text: text.into(),
            registered_only: false,
            comment_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn registered_only(mut self) -> Self {
        self.registered_only = true;
        self
    }
}

impl Secured for Article {
    const KIND: &'static str = "article";

    fn access_policy() -> &'static AccessPolicy<Self> {
        static POLICY: OnceLock<AccessPolicy<Article>> = OnceLock::new();
        POLICY.get_or_init(|| {
            AccessPolicy::new(Self::KIND)
                .class("create", |user, _| Ok(user.has_staff(|s| s.author)))
                .instance("read", |article: &Article, user, _| {
                    Ok(!article.registered_only || user.is_authenticated())
                })
                .instance("edit", |article: &Article, user, _| {
                    Ok(user.is(article.author.as_ref()) || user.has_staff(|s| s.editor))
                })
                .instance("delete", |article: &Article, user, _| {
                    Ok(user.is(article.author.as_ref()) && article.comment_count == 0)
                })
        })
    }
}
