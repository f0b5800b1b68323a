use async_trait::async_trait;
use futures::{future, StreamExt, TryStreamExt};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, DatabaseConnection, DeriveColumn, EntityTrait, EnumIter, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde_json::Value;
use uuid::Uuid;

use super::{matches, Document, DocumentStore, Filter, StorageError, ID_FIELD};

#[derive(Copy, Clone, Debug, EnumIter, DeriveColumn)]
enum QueryAs {
    Collection,
}

/// Keeps every collection in the single `document` table.
pub struct DatabaseStore(DatabaseConnection);

impl DatabaseStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self(conn)
    }
}

fn into_document(model: entity::Document) -> Result<Document, StorageError> {
    match model.data {
        Value::Object(mut map) => {
            map.insert(ID_FIELD.to_string(), Value::String(model.id.to_string()));
            Ok(map)
        }
        _ => Err(StorageError::Corrupt(model.id)),
    }
}

#[async_trait]
impl DocumentStore for DatabaseStore {
    async fn create_document(
        &self,
        collection: &str,
        record: Document,
    ) -> Result<Uuid, StorageError> {
        let id = Uuid::new_v4();
        let document = entity::DocumentActive {
            position: NotSet,
            id: Set(id),
            collection: Set(collection.to_string()),
            data: Set(Value::Object(record)),
        };
        entity::DocumentEntity::insert(document)
            .exec(&self.0)
            .await?;
        tracing::trace! {%id, %collection, "Inserted document"};
        Ok(id)
    }

    async fn get_documents(
        &self,
        collection: &str,
        filter: &Filter,
        limit: u64,
    ) -> Result<Vec<Document>, StorageError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let query = entity::DocumentEntity::find()
            .filter(entity::DocumentColumn::Collection.eq(collection))
            .order_by_asc(entity::DocumentColumn::Position);
        let models: Vec<entity::Document> = if filter.is_empty() {
            // SQL limits are signed
            query.limit(limit.min(i64::MAX as u64)).all(&self.0).await?
        } else {
            // filters apply to the JSON body, matched outside of SQL
            query
                .stream(&self.0)
                .await?
                .try_filter(|model| future::ready(matches(&model.data, filter)))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .try_collect()
                .await?
        };
        tracing::trace! {%collection, count = models.len(), "Fetched documents"};
        models.into_iter().map(into_document).collect()
    }

    async fn collection_names(&self) -> Result<Vec<String>, StorageError> {
        Ok(entity::DocumentEntity::find()
            .select_only()
            .column_as(entity::DocumentColumn::Collection, QueryAs::Collection)
            .group_by(entity::DocumentColumn::Collection)
            .order_by_asc(entity::DocumentColumn::Collection)
            .into_values::<String, QueryAs>()
            .all(&self.0)
            .await?)
    }
}
