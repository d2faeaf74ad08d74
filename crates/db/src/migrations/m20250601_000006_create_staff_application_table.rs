//! Create staff application table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StaffApplication::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StaffApplication::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StaffApplication::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(StaffApplication::Categories)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StaffApplication::Experience).text().not_null())
                    .col(ColumnDef::new(StaffApplication::Skills).text().not_null())
                    .col(
                        ColumnDef::new(StaffApplication::Availability)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StaffApplication::Motivation).text().not_null())
                    .col(ColumnDef::new(StaffApplication::PreviousExperience).text())
                    .col(
                        ColumnDef::new(StaffApplication::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(StaffApplication::ReviewedById).string_len(32))
                    .col(ColumnDef::new(StaffApplication::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(StaffApplication::AdminNotes).text())
                    .col(
                        ColumnDef::new(StaffApplication::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_application_user")
                            .from(StaffApplication::Table, StaffApplication::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_application_reviewed_by")
                            .from(StaffApplication::Table, StaffApplication::ReviewedById)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: status (pending-review listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_staff_application_status")
                    .table(StaffApplication::Table)
                    .col(StaffApplication::Status)
                    .to_owned(),
            )
            .await?;

        // Partial unique index: one pending application per user.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_staff_application_one_pending_per_user \
                 ON staff_application (user_id) WHERE status = 'pending'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StaffApplication::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StaffApplication {
    Table,
    Id,
    UserId,
    Categories,
    Experience,
    Skills,
    Availability,
    Motivation,
    PreviousExperience,
    Status,
    ReviewedById,
    ReviewedAt,
    AdminNotes,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
