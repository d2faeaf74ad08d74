//! Create complaint table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Complaint::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Complaint::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Complaint::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Complaint::Description).text().not_null())
                    .col(ColumnDef::new(Complaint::Category).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Complaint::Anonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Complaint::UserId).string_len(32))
                    .col(ColumnDef::new(Complaint::AssignedToId).string_len(32))
                    .col(ColumnDef::new(Complaint::StatusId).string_len(32))
                    .col(
                        ColumnDef::new(Complaint::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Complaint::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_user")
                            .from(Complaint::Table, Complaint::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_assigned_to")
                            .from(Complaint::Table, Complaint::AssignedToId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_status")
                            .from(Complaint::Table, Complaint::StatusId)
                            .to(ComplaintStatus::Table, ComplaintStatus::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: status (per-status counts, sweep filtering)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_status_id")
                    .table(Complaint::Table)
                    .col(Complaint::StatusId)
                    .to_owned(),
            )
            .await?;

        // Index: category (report filtering)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_category")
                    .table(Complaint::Table)
                    .col(Complaint::Category)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (listings, recency stats, age gate)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_created_at")
                    .table(Complaint::Table)
                    .col(Complaint::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Complaint::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
    Title,
    Description,
    Category,
    Anonymous,
    UserId,
    AssignedToId,
    StatusId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum ComplaintStatus {
    Table,
    Id,
}
