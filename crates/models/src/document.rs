//! `document` table: one JSONB body per stored record, grouped by collection.
use sea_orm::{entity::prelude::*, sea_query::Expr, DatabaseConnection, QueryOrder, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub collection: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub body: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn validate_collection(collection: &str) -> Result<(), errors::ModelError> {
    if collection.trim().is_empty() {
        return Err(errors::ModelError::Validation("collection required".into()));
    }
    Ok(())
}

fn validate_body(body: &JsonValue) -> Result<(), errors::ModelError> {
    if !body.is_object() {
        return Err(errors::ModelError::Validation("document body must be a JSON object".into()));
    }
    Ok(())
}

/// Insert a new document with a fresh id.
pub async fn insert(db: &DatabaseConnection, collection: &str, body: JsonValue) -> Result<Model, errors::ModelError> {
    validate_collection(collection)?;
    validate_body(&body)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        collection: Set(collection.to_string()),
        body: Set(body),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, collection: &str, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    let found = Entity::find_by_id(id)
        .filter(Column::Collection.eq(collection))
        .one(db)
        .await?;
    Ok(found)
}

/// All documents of `collection` whose body contains every entry of `filter`.
///
/// For scalar values JSONB containment is plain equality, so `{"ects": 6}`
/// matches exactly the documents with `ects == 6`.
pub async fn find_matching(db: &DatabaseConnection, collection: &str, filter: &JsonValue) -> Result<Vec<Model>, errors::ModelError> {
    validate_body(filter)?;
    let mut query = Entity::find().filter(Column::Collection.eq(collection));
    if filter.as_object().is_some_and(|m| !m.is_empty()) {
        query = query.filter(Expr::cust_with_values("\"body\" @> $1", [filter.clone()]));
    }
    let rows = query
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

/// Overwrite the top-level keys of `fields` in the stored body (`body || fields`).
/// Returns whether a document was touched.
pub async fn merge_fields(db: &DatabaseConnection, collection: &str, id: Uuid, fields: &JsonValue) -> Result<bool, errors::ModelError> {
    validate_body(fields)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::update_many()
        .col_expr(Column::Body, Expr::cust_with_values("\"body\" || $1", [fields.clone()]))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id))
        .filter(Column::Collection.eq(collection))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

/// Hard delete; returns the number of removed rows (0 or 1).
pub async fn delete(db: &DatabaseConnection, collection: &str, id: Uuid) -> Result<u64, errors::ModelError> {
    let res = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::Collection.eq(collection))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
