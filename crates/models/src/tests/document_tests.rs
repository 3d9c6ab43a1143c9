use crate::db::connect;
use crate::document;
use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;

/// Setup test database with migrations; `None` when no database is configured.
async fn setup_test_db() -> Result<Option<DatabaseConnection>> {
    let _ = dotenvy::dotenv();
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Some(db))
}

fn unique_collection() -> String {
    format!("test_docs_{}", Uuid::new_v4().simple())
}

#[tokio::test]
async fn test_document_crud() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let collection = unique_collection();

    let created = document::insert(&db, &collection, json!({"name": "Mathematik", "ects": 6})).await?;
    assert_eq!(created.collection, collection);

    let found = document::find_by_id(&db, &collection, created.id).await?;
    assert_eq!(found.map(|m| m.body), Some(json!({"name": "Mathematik", "ects": 6})));

    // same id, other collection: invisible
    assert!(document::find_by_id(&db, "other_collection", created.id).await?.is_none());

    let touched = document::merge_fields(&db, &collection, created.id, &json!({"ects": 8})).await?;
    assert!(touched);
    let found = document::find_by_id(&db, &collection, created.id).await?.unwrap();
    assert_eq!(found.body, json!({"name": "Mathematik", "ects": 8}));

    assert_eq!(document::delete(&db, &collection, created.id).await?, 1);
    assert_eq!(document::delete(&db, &collection, created.id).await?, 0);
    assert!(!document::merge_fields(&db, &collection, created.id, &json!({"ects": 1})).await?);
    Ok(())
}

#[tokio::test]
async fn test_find_matching_uses_containment() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let collection = unique_collection();

    document::insert(&db, &collection, json!({"name": "A", "ects": 6})).await?;
    document::insert(&db, &collection, json!({"name": "B", "ects": 8})).await?;
    document::insert(&db, &collection, json!({"name": "C", "ects": 6})).await?;

    let all = document::find_matching(&db, &collection, &json!({})).await?;
    assert_eq!(all.len(), 3);

    let six = document::find_matching(&db, &collection, &json!({"ects": 6})).await?;
    let names: Vec<_> = six.iter().map(|m| m.body["name"].clone()).collect();
    assert_eq!(names, vec![json!("A"), json!("C")]);

    let none = document::find_matching(&db, &collection, &json!({"ects": "6"})).await?;
    assert!(none.is_empty());

    for m in all {
        document::delete(&db, &collection, m.id).await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_rejects_non_object_body() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let err = document::insert(&db, "kurse", json!([1, 2])).await;
    assert!(matches!(err, Err(crate::errors::ModelError::Validation(_))));
    Ok(())
}
