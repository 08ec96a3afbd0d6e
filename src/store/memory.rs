use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{merge_patch, Document, DocumentStore, Filter, Sort, StoreError};

/// In-process document store, used by the test suite and by memory-backed
/// development runs. A single write lock over the collection map gives the
/// per-document atomicity the adapter contract requires.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_document(body: Value) -> Document {
        Document {
            id: Uuid::new_v4(),
            version: 1,
            created_at: Utc::now(),
            body,
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Sort,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();

        match sort {
            Sort::Unsorted => {}
            Sort::CreatedAsc => docs.sort_by_key(|d| d.created_at),
            Sort::CreatedDesc => {
                docs.sort_by_key(|d| d.created_at);
                docs.reverse();
            }
        }

        Ok(docs)
    }

    async fn insert_one(&self, collection: &str, body: Value) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let doc = Self::new_document(body);
        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn upsert_one(
        &self,
        collection: &str,
        filter: &Filter,
        insert: Value,
        patch: Value,
    ) -> Result<Document, StoreError> {
        // Find-or-create under the write lock, so concurrent upserts on the
        // same filter can never both take the insert path.
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if let Some(doc) = docs.iter_mut().find(|d| filter.matches(d)) {
            merge_patch(&mut doc.body, &patch);
            doc.version += 1;
            return Ok(doc.clone());
        }

        let doc = Self::new_document(insert);
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn replace_one(
        &self,
        collection: &str,
        id: Uuid,
        expected_version: i64,
        body: Value,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StoreError::NotFound)?;

        if doc.version != expected_version {
            return Err(StoreError::VersionConflict(id));
        }

        doc.body = body;
        doc.version += 1;
        Ok(doc.clone())
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(false),
        };

        match docs.iter().position(|d| filter.matches(d)) {
            Some(pos) => {
                docs.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(0),
        };

        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }

    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
