//! Create complaint status table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComplaintStatus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintStatus::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ComplaintStatus::Code).string_len(64).not_null())
                    .col(ColumnDef::new(ComplaintStatus::Display).string_len(128).not_null())
                    .to_owned(),
            )
            .await?;

        // Unique index: codes are looked up (and created) by name
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_status_code")
                    .table(ComplaintStatus::Table)
                    .col(ComplaintStatus::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComplaintStatus::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ComplaintStatus {
    Table,
    Id,
    Code,
    Display,
}
