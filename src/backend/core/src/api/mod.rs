//! HTTP service exposing the blog through access-gated handlers.
//!
//! # Routes
//!
//! | Method | Path                              | Required action     |
//! |--------|-----------------------------------|---------------------|
//! | GET    | `/health`                         | none                |
//! | GET    | `/api/v1/articles`                | `read`, per article |
//! | POST   | `/api/v1/articles`                | article `create`    |
//! | GET    | `/api/v1/articles/:id`            | article `read`      |
//! | PUT    | `/api/v1/articles/:id`            | article `edit`      |
//! | DELETE | `/api/v1/articles/:id`            | article `delete`    |
//! | POST   | `/api/v1/articles/:id/comments`   | comment `create`    |
//! | GET    | `/api/v1/comments/:id`            | comment `read`      |
//! | PUT    | `/api/v1/comments/:id`            | comment `edit`      |
//! | DELETE | `/api/v1/comments/:id`            | comment `delete`    |
//!
//! The requesting user is named by the `X-User-Id` header (configurable);
//! requests without it, or naming an unknown user, run as anonymous.

mod handlers;

use axum::{
    http::HeaderName,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::blog::{Article, Comment};
use crate::handler::InMemoryStore;
use crate::identity::UserDirectory;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub articles: InMemoryStore<Article>,
    pub comments: InMemoryStore<Comment>,
    pub users: UserDirectory,
    user_header: HeaderName,
}

impl AppState {
    pub fn new(users: UserDirectory) -> Self {
        Self {
            articles: InMemoryStore::new(),
            comments: InMemoryStore::new(),
            users,
            user_header: HeaderName::from_static("x-user-id"),
        }
    }

    pub fn with_user_header(mut self, header: HeaderName) -> Self {
        self.user_header = header;
        self
    }

    pub fn user_header(&self) -> &HeaderName {
        &self.user_header
    }
}

/// Build the API router.
///
/// # Example
///
/// ```rust,ignore
/// let state = AppState::new(users);
/// let app = build_router(state);
/// ```
pub fn build_router(state: AppState) -> Router {
    let v1 = Router::new()
        .route(
            "/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .route(
            "/articles/:id",
            get(handlers::get_article)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .route("/articles/:id/comments", post(handlers::create_comment))
        .route(
            "/comments/:id",
            get(handlers::get_comment)
                .put(handlers::update_comment)
                .delete(handlers::delete_comment),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", v1)
        .fallback(handlers::route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API response wrapper.
#[derive(Debug, serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success("test data");
        assert!(response.success);
        assert_eq!(response.data, Some("test data"));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_api_response_error() {
        let response: ApiResponse<()> = ApiResponse::error("test error");
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error, Some("test error".to_string()));
    }

    #[test]
    fn test_user_header_override() {
        let state = AppState::new(UserDirectory::new());
        assert_eq!(state.user_header(), "x-user-id");

        let state = state.with_user_header(HeaderName::from_static("x-forwarded-user"));
        assert_eq!(state.user_header(), "x-forwarded-user");
    }
}
