use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_urls::Url;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Index backing per-owner listing and owner-scoped soft deletes.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_user_id")
                    .table(Url::Table)
                    .col(Url::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_urls_user_id").to_owned())
            .await
    }
}
