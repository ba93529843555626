use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 urls 表
        manager
            .create_table(
                Table::create()
                    .table(Url::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Url::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Url::Code).string().not_null())
                    .col(ColumnDef::new(Url::Url).text().not_null())
                    .col(ColumnDef::new(Url::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Url::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // 短码唯一，删除后也不复用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_code")
                    .table(Url::Table)
                    .col(Url::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 原始 URL 唯一，冲突时由存储层回查已有短码
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_url")
                    .table(Url::Table)
                    .col(Url::Url)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_urls_url").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_urls_code").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Url::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Url {
    #[sea_orm(iden = "urls")]
    Table,
    Id,
    Code,
    Url,
    UserId,
    IsDeleted,
}
