use entity::{DocumentColumn, DocumentEntity};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

static COLLECTION_INDEX: &str = "idx-document-collection";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DocumentEntity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentColumn::Position)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentColumn::Id)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DocumentColumn::Collection).string().not_null())
                    .col(ColumnDef::new(DocumentColumn::Data).json().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(COLLECTION_INDEX)
                    .table(DocumentEntity)
                    .col(DocumentColumn::Collection)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentEntity).to_owned())
            .await
    }
}
