//! Indexes for collection scans and JSONB containment filters.
use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_document::Document;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_document_collection")
                    .table(Document::Table)
                    .col(Document::Collection)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // GIN index backs `body @> $1` filters
        manager
            .get_connection()
            .execute_unprepared("CREATE INDEX IF NOT EXISTS idx_document_body ON document USING GIN (body jsonb_path_ops)")
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_document_body")
            .await?;
        manager
            .drop_index(Index::drop().name("idx_document_collection").table(Document::Table).to_owned())
            .await
    }
}
