use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::collection::Doc;

/// One entry in the like set. A user id appears at most once; insertion order
/// is display order (newest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub user: Uuid,
}

/// Embedded comment. `name` and `avatar` are copied from the commenting user
/// at creation time and never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

/// Stored post document body. `name` and `avatar` are denormalized from the
/// author at creation; later profile edits do not propagate back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub user: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    pub date: DateTime<Utc>,
}

impl PostView {
    pub fn from_doc(doc: Doc<Post>) -> Self {
        let post = doc.data;
        Self {
            id: doc.id,
            user: post.user,
            text: post.text,
            name: post.name,
            avatar: post.avatar,
            likes: post.likes,
            comments: post.comments,
            date: post.date,
        }
    }
}
