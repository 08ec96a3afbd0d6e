pub mod collection;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Collection names used by the services.
pub const USERS: &str = "users";
pub const PROFILES: &str = "profiles";
pub const POSTS: &str = "posts";

/// Errors from the document store adapter
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found")]
    NotFound,

    #[error("Version conflict on document {0}")]
    VersionConflict(Uuid),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store operation timed out")]
    Timeout,

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persisted envelope around a JSON document body. `version` supports
/// compare-and-swap replacement; `created_at` supports newest-first listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub body: Value,
}

/// Equality filter over the document id and top-level body fields.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub id: Option<Uuid>,
    pub fields: Vec<(String, Value)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            fields: Vec::new(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Serialize) -> Self {
        Self::default().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.push((field.into(), value));
        self
    }

    /// Equality match against a document, used by the memory store.
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(id) = self.id {
            if doc.id != id {
                return false;
            }
        }
        self.fields
            .iter()
            .all(|(field, value)| doc.body.get(field) == Some(value))
    }

    /// JSON object of the field clauses, used for JSONB containment queries.
    pub fn body_clauses(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (field, value) in &self.fields {
            map.insert(field.clone(), value.clone());
        }
        Value::Object(map)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Unsorted,
    CreatedAsc,
    CreatedDesc,
}

/// Generic persistent key-document service. Implementations must provide
/// per-document atomicity: `upsert_one` is an atomic find-or-create /
/// find-and-patch keyed by the filter, and `replace_one` is a version-checked
/// compare-and-swap.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError>;

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Sort,
    ) -> Result<Vec<Document>, StoreError>;

    async fn insert_one(&self, collection: &str, body: Value) -> Result<Document, StoreError>;

    /// If a document matches `filter`, shallow-merge `patch` into its body;
    /// otherwise insert `insert`. Atomic with respect to concurrent upserts
    /// on the same filter, so a keyed upsert can never create duplicates.
    async fn upsert_one(
        &self,
        collection: &str,
        filter: &Filter,
        insert: Value,
        patch: Value,
    ) -> Result<Document, StoreError>;

    /// Replace the whole body if the stored version still matches
    /// `expected_version`; otherwise fail with `VersionConflict`.
    async fn replace_one(
        &self,
        collection: &str,
        id: Uuid,
        expected_version: i64,
        body: Value,
    ) -> Result<Document, StoreError>;

    /// Delete the first match. Returns false when nothing matched; absence is
    /// not an error so deletion stays idempotent.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    async fn health(&self) -> Result<(), StoreError>;
}

/// Shallow merge of top-level patch keys into a document body.
pub(crate) fn merge_patch(body: &mut Value, patch: &Value) {
    if let (Value::Object(target), Value::Object(source)) = (body, patch) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
}
