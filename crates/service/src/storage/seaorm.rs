use async_trait::async_trait;
use models::{document, errors::ModelError};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use uuid::Uuid;

use super::{sort_records, DocumentStore};
use crate::{errors::ServiceError, record::{Document, Record}};

/// PostgreSQL-backed store: every record is a row of the `document` table
/// with its fields in a JSONB `body`.
#[derive(Clone)]
pub struct SeaOrmDocumentStore {
    pub db: DatabaseConnection,
}

impl SeaOrmDocumentStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn map_err(e: ModelError) -> ServiceError {
    match e {
        ModelError::Db(msg) => ServiceError::Storage(msg),
        other => ServiceError::Model(other),
    }
}

fn to_record(model: document::Model) -> Record {
    let fields = match model.body {
        Value::Object(map) => map,
        _ => Document::new(),
    };
    Record::new(model.id, fields)
}

#[async_trait]
impl DocumentStore for SeaOrmDocumentStore {
    async fn find(&self, collection: &str, filter: &Document, sort: &[&str]) -> Result<Vec<Record>, ServiceError> {
        let rows = document::find_matching(&self.db, collection, &Value::Object(filter.clone()))
            .await
            .map_err(map_err)?;
        let mut records: Vec<Record> = rows.into_iter().map(to_record).collect();
        sort_records(&mut records, sort);
        Ok(records)
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Record>, ServiceError> {
        let found = document::find_by_id(&self.db, collection, id).await.map_err(map_err)?;
        Ok(found.map(to_record))
    }

    async fn insert(&self, collection: &str, fields: Document) -> Result<Record, ServiceError> {
        let model = document::insert(&self.db, collection, Value::Object(fields)).await.map_err(map_err)?;
        Ok(to_record(model))
    }

    async fn set_fields(&self, collection: &str, id: Uuid, fields: Document) -> Result<bool, ServiceError> {
        document::merge_fields(&self.db, collection, id, &Value::Object(fields)).await.map_err(map_err)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<u64, ServiceError> {
        document::delete(&self.db, collection, id).await.map_err(map_err)
    }
}
