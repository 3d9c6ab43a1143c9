//! Storage abstractions for service layer
//!
//! [`DocumentStore`] is the storage collaborator of the entity services: a
//! document store with find / insert / update / delete by identifier, grouped
//! into named collections. Two implementations:
//! - [`json_document_store::JsonDocumentStore`]: JSON file or plain memory
//! - [`seaorm::SeaOrmDocumentStore`]: PostgreSQL `document` table (JSONB bodies)

pub mod json_document_store;
pub mod seaorm;

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::{errors::ServiceError, record::{Document, Record}};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Records whose fields equal every entry of `filter`, ascending by `sort` keys.
    async fn find(&self, collection: &str, filter: &Document, sort: &[&str]) -> Result<Vec<Record>, ServiceError>;
    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Record>, ServiceError>;
    /// Persist a new record; the store assigns the identifier.
    async fn insert(&self, collection: &str, fields: Document) -> Result<Record, ServiceError>;
    /// Overwrite the given top-level fields; returns whether the record exists.
    async fn set_fields(&self, collection: &str, id: Uuid, fields: Document) -> Result<bool, ServiceError>;
    /// Hard delete; returns the number of removed records.
    async fn delete(&self, collection: &str, id: Uuid) -> Result<u64, ServiceError>;
}

/// Exact-equality match on every filter entry. A missing field never matches.
pub fn matches_filter(fields: &Document, filter: &Document) -> bool {
    filter.iter().all(|(k, v)| fields.get(k) == Some(v))
}

// null/missing < numbers < strings < objects < arrays < booleans
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order over optional JSON values used for sorting search results.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) if matches!(type_rank(a), 3 | 4) && type_rank(a) == type_rank(b) => {
            x.to_string().cmp(&y.to_string())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Sort ascending by `keys` in order; remaining ties are broken by id so the
/// result does not depend on storage iteration order.
pub fn sort_records(records: &mut [Record], keys: &[&str]) {
    records.sort_by(|a, b| {
        keys.iter()
            .map(|k| compare_values(a.get(k), b.get(k)))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    });
}
