use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::{Document, DocumentStore, Filter, Sort, StoreError};

/// A typed document with its envelope metadata.
#[derive(Debug, Clone)]
pub struct Doc<T> {
    pub id: Uuid,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub data: T,
}

/// Typed view over one store collection: serializes/deserializes bodies and
/// bounds every store call with the configured operation timeout.
pub struct Collection<T> {
    name: &'static str,
    store: Arc<dyn DocumentStore>,
    op_timeout: Duration,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            store: self.store.clone(),
            op_timeout: self.op_timeout,
            _phantom: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(name: &'static str, store: Arc<dyn DocumentStore>, op_timeout: Duration) -> Self {
        Self {
            name,
            store,
            op_timeout,
            _phantom: PhantomData,
        }
    }

    async fn bounded<F, R>(&self, fut: F) -> Result<R, StoreError>
    where
        F: Future<Output = Result<R, StoreError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        }
    }

    fn decode(doc: Document) -> Result<Doc<T>, StoreError> {
        let data = serde_json::from_value(doc.body)?;
        Ok(Doc {
            id: doc.id,
            version: doc.version,
            created_at: doc.created_at,
            data,
        })
    }

    fn encode(data: &T) -> Result<Value, StoreError> {
        Ok(serde_json::to_value(data)?)
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<Doc<T>>, StoreError> {
        let doc = self.bounded(self.store.find_one(self.name, filter)).await?;
        doc.map(Self::decode).transpose()
    }

    pub async fn find_many(&self, filter: &Filter, sort: Sort) -> Result<Vec<Doc<T>>, StoreError> {
        let docs = self.bounded(self.store.find_many(self.name, filter, sort)).await?;
        docs.into_iter().map(Self::decode).collect()
    }

    pub async fn insert_one(&self, data: &T) -> Result<Doc<T>, StoreError> {
        let body = Self::encode(data)?;
        let doc = self.bounded(self.store.insert_one(self.name, body)).await?;
        Self::decode(doc)
    }

    pub async fn upsert_one(&self, filter: &Filter, insert: &T, patch: Value) -> Result<Doc<T>, StoreError> {
        let insert = Self::encode(insert)?;
        let doc = self
            .bounded(self.store.upsert_one(self.name, filter, insert, patch))
            .await?;
        Self::decode(doc)
    }

    /// Compare-and-swap replacement using the version carried by `doc`.
    pub async fn replace(&self, doc: &Doc<T>) -> Result<Doc<T>, StoreError> {
        let body = Self::encode(&doc.data)?;
        let updated = self
            .bounded(self.store.replace_one(self.name, doc.id, doc.version, body))
            .await?;
        Self::decode(updated)
    }

    pub async fn delete_one(&self, filter: &Filter) -> Result<bool, StoreError> {
        self.bounded(self.store.delete_one(self.name, filter)).await
    }

    pub async fn delete_many(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.bounded(self.store.delete_many(self.name, filter)).await
    }
}
