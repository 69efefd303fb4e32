//! API request handlers.
//!
//! Each handler builds a [`RequestContext`] from the request and runs its
//! logic through a [`GatedHandler`], so access is decided before any record
//! is touched. Errors convert to HTTP responses through `PortcullisError`.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::{ApiResponse, AppState};
use crate::access::{Action, Secured};
use crate::blog::{Article, Comment};
use crate::error::{PortcullisError, Result};
use crate::handler::{EntityGuard, GatedHandler, RequestContext};

const REQUEST_ID_HEADER: &str = "x-request-id";

fn request_context(state: &AppState, headers: &HeaderMap) -> RequestContext {
    let user_id = headers
        .get(state.user_header())
        .and_then(|value| value.to_str().ok());
    let request = RequestContext::new(state.users.resolve(user_id));

    match headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(request_id) => request.with_request_id(request_id),
        None => request,
    }
}

fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PortcullisError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn located<T>(target: Option<T>, kind: &str) -> Result<T> {
    target.ok_or_else(|| PortcullisError::internal(format!("no {} located for request", kind)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Health Check
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("route not found")),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// Article Handlers
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub registered_only: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub registered_only: Option<bool>,
}

/// Articles the requesting user may read.
pub async fn list_articles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let request = request_context(&state, &headers);

    let mut visible = Vec::new();
    for article in state.articles.values() {
        if article
            .check_access(Action::READ, request.user(), request.context())?
            .is_empty()
        {
            visible.push(article);
        }
    }
    visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(ApiResponse::success(visible)))
}

pub async fn create_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse> {
    let request = request_context(&state, &headers);

    let gated = GatedHandler::new(
        EntityGuard::new(state.articles.clone()).require(Action::CREATE),
        |request: &RequestContext, _: Option<Article>| -> Result<Article> {
            require_text("title", &req.title)?;
            require_text("text", &req.text)?;

            let author = request.user().id().cloned().ok_or_else(PortcullisError::forbidden)?;
            let mut article = Article::new(author, req.title.clone(), req.text.clone());
            article.registered_only = req.registered_only;
            state.articles.insert(article.id, article.clone());

            info!(article_id = %article.id, author = %request.user(), "Article created");
            Ok(article)
        },
    );

    let article = gated.dispatch(&request)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(article))))
}

pub async fn get_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let request = request_context(&state, &headers).with_param("id", id);

    let gated = GatedHandler::new(
        EntityGuard::new(state.articles.clone()).require(Action::READ),
        |_: &RequestContext, article: Option<Article>| located(article, Article::KIND),
    );

    Ok(Json(ApiResponse::success(gated.dispatch(&request)?)))
}

pub async fn update_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateArticleRequest>,
) -> Result<impl IntoResponse> {
    let request = request_context(&state, &headers).with_param("id", id);

    let gated = GatedHandler::new(
        EntityGuard::new(state.articles.clone()).require(Action::EDIT),
        |_: &RequestContext, article: Option<Article>| -> Result<Article> {
            let article = located(article, Article::KIND)?;
            if let Some(title) = &req.title {
                require_text("title", title)?;
            }
            if let Some(text) = &req.text {
                require_text("text", text)?;
            }

            state
                .articles
                .update(&article.id, |stored| {
                    if let Some(title) = &req.title {
                        stored.title = title.clone();
                    }
                    if let Some(text) = &req.text {
                        stored.text = text.clone();
                    }
                    if let Some(registered_only) = req.registered_only {
                        stored.registered_only = registered_only;
                    }
                })
                .ok_or_else(|| PortcullisError::not_found(Article::KIND, article.id.to_string()))
        },
    );

    Ok(Json(ApiResponse::success(gated.dispatch(&request)?)))
}

pub async fn delete_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let request = request_context(&state, &headers).with_param("id", id);

    let gated = GatedHandler::new(
        EntityGuard::new(state.articles.clone()).require(Action::DELETE),
        |request: &RequestContext, article: Option<Article>| -> Result<Article> {
            let article = located(article, Article::KIND)?;
            // Comments may have landed since the guard's snapshot.
            let article = state
                .articles
                .remove_if(&article.id, |current| {
                    let denied = current.check_access(Action::DELETE, request.user(), request.context())?;
                    if denied.is_empty() {
                        Ok(())
                    } else {
                        Err(PortcullisError::forbidden())
                    }
                })?
                .ok_or_else(|| PortcullisError::not_found(Article::KIND, article.id.to_string()))?;

            info!(article_id = %article.id, user = %request.user(), "Article deleted");
            Ok(article)
        },
    );

    Ok(Json(ApiResponse::success(gated.dispatch(&request)?)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Comment Handlers
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

/// Comment on an article the user can read.
///
/// The route's `id` names the article, so the comment guard sees an
/// unaddressed request and checks `create` against the type.
pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(article_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse> {
    let request = request_context(&state, &headers).with_param("article_id", article_id);

    let gated = GatedHandler::new(
        EntityGuard::new(state.comments.clone()).require(Action::CREATE),
        |request: &RequestContext, _: Option<Comment>| -> Result<Comment> {
            require_text("text", &req.text)?;

            let article_id = request
                .params()
                .uuid("article_id")?
                .ok_or_else(|| PortcullisError::validation("article id is required"))?;
            let article = state
                .articles
                .get(&article_id)
                .ok_or_else(|| PortcullisError::not_found(Article::KIND, article_id.to_string()))?;
            if !article
                .check_access(Action::READ, request.user(), request.context())?
                .is_empty()
            {
                return Err(PortcullisError::forbidden());
            }

            let author = request.user().id().cloned().ok_or_else(PortcullisError::forbidden)?;
            // Count first: a deletion sees the new count or the comment is never stored.
            state
                .articles
                .update(&article.id, |a| a.comment_count += 1)
                .ok_or_else(|| PortcullisError::not_found(Article::KIND, article.id.to_string()))?;
            let comment = Comment::new(article.id, author, req.text.clone());
            state.comments.insert(comment.id, comment.clone());

            info!(comment_id = %comment.id, article_id = %article.id, "Comment created");
            Ok(comment)
        },
    );

    let comment = gated.dispatch(&request)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(comment))))
}

pub async fn get_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let request = request_context(&state, &headers).with_param("id", id);

    let gated = GatedHandler::new(
        EntityGuard::new(state.comments.clone()).require(Action::READ),
        |_: &RequestContext, comment: Option<Comment>| located(comment, Comment::KIND),
    );

    Ok(Json(ApiResponse::success(gated.dispatch(&request)?)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse> {
    let request = request_context(&state, &headers).with_param("id", id);

    let gated = GatedHandler::new(
        EntityGuard::new(state.comments.clone()).require(Action::EDIT),
        |_: &RequestContext, comment: Option<Comment>| -> Result<Comment> {
            let comment = located(comment, Comment::KIND)?;
            require_text("text", &req.text)?;

            state
                .comments
                .update(&comment.id, |stored| stored.text = req.text.clone())
                .ok_or_else(|| PortcullisError::not_found(Comment::KIND, comment.id.to_string()))
        },
    );

    Ok(Json(ApiResponse::success(gated.dispatch(&request)?)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let request = request_context(&state, &headers).with_param("id", id);

    let gated = GatedHandler::new(
        EntityGuard::new(state.comments.clone()).require(Action::DELETE),
        |request: &RequestContext, comment: Option<Comment>| -> Result<Comment> {
            let comment = located(comment, Comment::KIND)?;
            state
                .comments
                .remove(&comment.id)
                .ok_or_else(|| PortcullisError::not_found(Comment::KIND, comment.id.to_string()))?;
            state.articles.update(&comment.article_id, |a| {
                a.comment_count = a.comment_count.saturating_sub(1)
            });

            info!(comment_id = %comment.id, user = %request.user(), "Comment deleted");
            Ok(comment)
        },
    );

    Ok(Json(ApiResponse::success(gated.dispatch(&request)?)))
}
