mod database;

use async_trait::async_trait;
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use database::DatabaseStore;

/// Key under which fetched documents carry their storage identifier.
pub static ID_FIELD: &str = "_id";

pub type Document = Map<String, Value>;
pub type Filter = Map<String, Value>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database is not available")]
    Unavailable,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Could not serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Record is not a JSON object")]
    NotAnObject,

    #[error("Stored document {0} is not a JSON object")]
    Corrupt(Uuid),
}

/// Schema-less records grouped into named collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists `record` in `collection` and returns its generated identifier.
    async fn create_document(&self, collection: &str, record: Document)
        -> Result<Uuid, StorageError>;

    /// Returns at most `limit` documents of `collection` equal to `filter` on
    /// every key of the filter, oldest first. An empty filter matches everything.
    async fn get_documents(
        &self,
        collection: &str,
        filter: &Filter,
        limit: u64,
    ) -> Result<Vec<Document>, StorageError>;

    async fn collection_names(&self) -> Result<Vec<String>, StorageError>;
}

pub async fn create_record<S, R>(
    store: &S,
    collection: &str,
    record: &R,
) -> Result<Uuid, StorageError>
where
    S: DocumentStore + ?Sized,
    R: Serialize + ?Sized,
{
    match serde_json::to_value(record)? {
        Value::Object(map) => store.create_document(collection, map).await,
        _ => Err(StorageError::NotAnObject),
    }
}

pub fn matches(document: &Value, filter: &Filter) -> bool {
    filter.iter().all(|(k, v)| document.get(k) == Some(v))
}
