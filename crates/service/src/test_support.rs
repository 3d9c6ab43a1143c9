#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::connect;

use crate::{schema::EntitySchema, storage::json_document_store::JsonDocumentStore, EntityService, MergePolicy};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Fresh connection with migrations applied, or `None` when no database is configured.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    let _ = dotenvy::dotenv();
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }

    // Run migrations exactly once, with a throwaway connection
    MIGRATED
        .get_or_try_init(|| async {
            let db = connect().await?;
            migration::Migrator::up(&db, None).await?;
            Ok::<(), anyhow::Error>(())
        })
        .await?;

    // Return a fresh connection for the current test's runtime
    Ok(Some(connect().await?))
}

/// Entity service over an in-memory store.
pub fn memory_service(schema: &'static EntitySchema, merge: MergePolicy) -> EntityService<JsonDocumentStore> {
    EntityService::new(schema, JsonDocumentStore::in_memory()).with_merge_policy(merge)
}
