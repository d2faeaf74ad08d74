//! Create complaint file table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComplaintFile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintFile::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ComplaintFile::ComplaintId).string_len(32).not_null())
                    .col(ColumnDef::new(ComplaintFile::FileName).string_len(256).not_null())
                    .col(
                        ColumnDef::new(ComplaintFile::OriginalFileName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplaintFile::FilePath).string_len(1024).not_null())
                    .col(ColumnDef::new(ComplaintFile::FileType).string_len(128).not_null())
                    .col(ColumnDef::new(ComplaintFile::FileCategory).string_len(32).not_null())
                    .col(ColumnDef::new(ComplaintFile::FileSize).big_integer().not_null())
                    .col(
                        ColumnDef::new(ComplaintFile::AdminOnly)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ComplaintFile::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_file_complaint")
                            .from(ComplaintFile::Table, ComplaintFile::ComplaintId)
                            .to(Complaint::Table, Complaint::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: complaint_id (per-complaint file listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_file_complaint_id")
                    .table(ComplaintFile::Table)
                    .col(ComplaintFile::ComplaintId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComplaintFile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ComplaintFile {
    Table,
    Id,
    ComplaintId,
    FileName,
    OriginalFileName,
    FilePath,
    FileType,
    FileCategory,
    FileSize,
    AdminOnly,
    UploadedAt,
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
}
