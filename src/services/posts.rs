use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::ownership::authorize_owner;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::models::{Comment, Like, Post, PostView, User};
use crate::store::collection::{Collection, Doc};
use crate::store::{DocumentStore, Filter, Sort, StoreError, POSTS, USERS};

/// Bound on compare-and-swap retries for like/unlike/comment paths.
const CAS_RETRIES: usize = 3;

#[derive(Debug, Default, Deserialize)]
pub struct PostInput {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentInput {
    pub text: Option<String>,
}

/// Post creation/deletion, the like set and the embedded comment list.
/// Like/unlike/comment are read-modify-write on one document; versioned CAS
/// keeps two concurrent likes from different users from losing an update.
#[derive(Clone)]
pub struct PostService {
    posts: Collection<Post>,
    users: Collection<User>,
}

impl PostService {
    pub fn new(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Self {
        let op_timeout = Duration::from_millis(config.store.op_timeout_ms);
        Self {
            posts: Collection::new(POSTS, store.clone(), op_timeout),
            users: Collection::new(USERS, store, op_timeout),
        }
    }

    pub async fn create(&self, identity: &AuthUser, input: PostInput) -> Result<PostView, ApiError> {
        let text = validate_text(&input.text)?;
        let author = self.author(identity).await?;

        let post = Post {
            user: identity.user_id,
            text,
            name: author.data.name,
            avatar: author.data.avatar,
            likes: Vec::new(),
            comments: Vec::new(),
            date: Utc::now(),
        };
        let doc = self.posts.insert_one(&post).await?;
        Ok(PostView::from_doc(doc))
    }

    pub async fn list(&self) -> Result<Vec<PostView>, ApiError> {
        let docs = self.posts.find_many(&Filter::all(), Sort::CreatedDesc).await?;
        Ok(docs.into_iter().map(PostView::from_doc).collect())
    }

    pub async fn get(&self, post_id: Uuid) -> Result<PostView, ApiError> {
        let doc = self.fetch(post_id).await?;
        Ok(PostView::from_doc(doc))
    }

    pub async fn delete(&self, identity: &AuthUser, post_id: Uuid) -> Result<(), ApiError> {
        let doc = self.fetch(post_id).await?;
        authorize_owner(doc.data.user, identity)?;
        self.posts.delete_one(&Filter::by_id(post_id)).await?;
        Ok(())
    }

    pub async fn like(&self, identity: &AuthUser, post_id: Uuid) -> Result<Vec<Like>, ApiError> {
        let doc = self
            .mutate(post_id, |post| {
                if post.likes.iter().any(|like| like.user == identity.user_id) {
                    return Err(ApiError::conflict("Already liked."));
                }
                post.likes.insert(0, Like { user: identity.user_id });
                Ok(())
            })
            .await?;
        Ok(doc.data.likes)
    }

    pub async fn unlike(&self, identity: &AuthUser, post_id: Uuid) -> Result<Vec<Like>, ApiError> {
        let doc = self
            .mutate(post_id, |post| {
                let pos = post
                    .likes
                    .iter()
                    .position(|like| like.user == identity.user_id)
                    .ok_or_else(|| ApiError::conflict("Post has not yet been liked."))?;
                post.likes.remove(pos);
                Ok(())
            })
            .await?;
        Ok(doc.data.likes)
    }

    pub async fn add_comment(
        &self,
        identity: &AuthUser,
        post_id: Uuid,
        input: CommentInput,
    ) -> Result<Vec<Comment>, ApiError> {
        let text = validate_text(&input.text)?;
        // Display fields resolved at comment-creation time, never updated after
        let author = self.author(identity).await?;

        let doc = self
            .mutate(post_id, |post| {
                post.comments.insert(
                    0,
                    Comment {
                        id: Uuid::new_v4(),
                        user: identity.user_id,
                        text: text.clone(),
                        name: author.data.name.clone(),
                        avatar: author.data.avatar.clone(),
                        date: Utc::now(),
                    },
                );
                Ok(())
            })
            .await?;
        Ok(doc.data.comments)
    }

    /// Only the comment's author may delete it; the post owner has no say.
    pub async fn delete_comment(
        &self,
        identity: &AuthUser,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Vec<Comment>, ApiError> {
        let doc = self
            .mutate(post_id, |post| {
                let pos = post
                    .comments
                    .iter()
                    .position(|comment| comment.id == comment_id)
                    .ok_or_else(|| ApiError::not_found("Comment not found."))?;
                authorize_owner(post.comments[pos].user, identity)?;
                post.comments.remove(pos);
                Ok(())
            })
            .await?;
        Ok(doc.data.comments)
    }

    async fn fetch(&self, post_id: Uuid) -> Result<Doc<Post>, ApiError> {
        self.posts
            .find_one(&Filter::by_id(post_id))
            .await?
            .ok_or_else(|| ApiError::not_found("Post not found."))
    }

    async fn author(&self, identity: &AuthUser) -> Result<Doc<User>, ApiError> {
        self.users
            .find_one(&Filter::by_id(identity.user_id))
            .await?
            .ok_or_else(|| ApiError::not_found("User not found."))
    }

    /// Read-modify-write on one post with bounded CAS retries.
    async fn mutate<F>(&self, post_id: Uuid, apply: F) -> Result<Doc<Post>, ApiError>
    where
        F: Fn(&mut Post) -> Result<(), ApiError>,
    {
        for _ in 0..CAS_RETRIES {
            let mut doc = self.fetch(post_id).await?;

            apply(&mut doc.data)?;

            match self.posts.replace(&doc).await {
                Ok(updated) => return Ok(updated),
                Err(StoreError::VersionConflict(_)) => continue,
                Err(other) => return Err(other.into()),
            }
        }
        Err(ApiError::conflict("The post was modified concurrently, please retry."))
    }
}

fn validate_text(text: &Option<String>) -> Result<String, ApiError> {
    let text = text.as_deref().unwrap_or_default().trim().to_string();
    if text.is_empty() {
        let mut field_errors = HashMap::new();
        field_errors.insert("text".to_string(), "Text is required".to_string());
        return Err(ApiError::validation_error("Missing required fields", Some(field_errors)));
    }
    Ok(text)
}
