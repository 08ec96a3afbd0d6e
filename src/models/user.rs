use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::collection::Doc;

/// Stored user document body. `password` holds the Argon2 hash and never
/// leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

/// Wire shape for a user: everything except the credential hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

impl UserView {
    pub fn from_doc(doc: &Doc<User>) -> Self {
        Self {
            id: doc.id,
            name: doc.data.name.clone(),
            email: doc.data.email.clone(),
            avatar: doc.data.avatar.clone(),
            date: doc.data.date,
        }
    }
}
