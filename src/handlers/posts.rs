use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::posts::{CommentInput, PostInput};
use crate::state::AppState;

use super::{ok, parse_doc_id};

/// POST /api/posts - Create a post
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<PostInput>,
) -> Result<Json<Value>, ApiError> {
    Ok(ok(state.posts.create(&user, input).await?))
}

/// GET /api/posts - All posts, newest first
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(ok(state.posts.list().await?))
}

/// GET /api/posts/:id - One post by id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let post_id = parse_doc_id(&id)?;
    Ok(ok(state.posts.get(post_id).await?))
}

/// DELETE /api/posts/:id - Delete own post
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let post_id = parse_doc_id(&id)?;
    state.posts.delete(&user, post_id).await?;
    Ok(ok("Post deleted."))
}

/// PUT /api/posts/like/:id - Like a post, returns the like set
pub async fn like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let post_id = parse_doc_id(&id)?;
    Ok(ok(state.posts.like(&user, post_id).await?))
}

/// PUT /api/posts/unlike/:id - Remove own like, returns the like set
pub async fn unlike(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let post_id = parse_doc_id(&id)?;
    Ok(ok(state.posts.unlike(&user, post_id).await?))
}

/// POST /api/posts/comment/:id - Comment on a post, returns the comment list
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<CommentInput>,
) -> Result<Json<Value>, ApiError> {
    let post_id = parse_doc_id(&id)?;
    Ok(ok(state.posts.add_comment(&user, post_id, input).await?))
}

/// DELETE /api/posts/comment/:id/:comment_id - Delete own comment
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let post_id = parse_doc_id(&id)?;
    let comment_id = parse_doc_id(&comment_id)?;
    Ok(ok(state.posts.delete_comment(&user, post_id, comment_id).await?))
}
