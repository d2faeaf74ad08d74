//! Create escalation table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Escalation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Escalation::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Escalation::ComplaintId).string_len(32).not_null())
                    .col(ColumnDef::new(Escalation::EscalatedById).string_len(32))
                    .col(ColumnDef::new(Escalation::EscalatedToId).string_len(32).not_null())
                    .col(ColumnDef::new(Escalation::Reason).text().not_null())
                    .col(
                        ColumnDef::new(Escalation::EscalationType)
                            .string_len(32)
                            .not_null()
                            .default("manual"),
                    )
                    .col(
                        ColumnDef::new(Escalation::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Escalation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Escalation::ResolvedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_escalation_complaint")
                            .from(Escalation::Table, Escalation::ComplaintId)
                            .to(Complaint::Table, Complaint::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_escalation_escalated_by")
                            .from(Escalation::Table, Escalation::EscalatedById)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_escalation_escalated_to")
                            .from(Escalation::Table, Escalation::EscalatedToId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: target + active flag (my-escalations, load counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_escalation_target_active")
                    .table(Escalation::Table)
                    .col(Escalation::EscalatedToId)
                    .col(Escalation::IsActive)
                    .to_owned(),
            )
            .await?;

        // Index: complaint_id (history listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_escalation_complaint_id")
                    .table(Escalation::Table)
                    .col(Escalation::ComplaintId)
                    .to_owned(),
            )
            .await?;

        // Partial unique index: at most one active escalation per complaint.
        // sea-query has no partial index builder, so raw SQL it is.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_escalation_one_active_per_complaint \
                 ON escalation (complaint_id) WHERE is_active",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Escalation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Escalation {
    Table,
    Id,
    ComplaintId,
    EscalatedById,
    EscalatedToId,
    Reason,
    EscalationType,
    IsActive,
    CreatedAt,
    ResolvedAt,
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
