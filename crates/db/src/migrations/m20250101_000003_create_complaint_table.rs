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
                    .col(ColumnDef::new(Complaint::Category).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Complaint::Priority)
                            .string_len(16)
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(Complaint::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Complaint::StudentId).string_len(32).not_null())
                    .col(ColumnDef::new(Complaint::AssignedTo).string_len(32))
                    .col(ColumnDef::new(Complaint::RoomNumber).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Complaint::Images)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Complaint::Resolution)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Complaint::ResolvedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Complaint::ResolvedBy).string_len(32))
                    .col(
                        ColumnDef::new(Complaint::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Complaint::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: student_id + created_at (a student's own list, newest first)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_student_id_created_at")
                    .table(Complaint::Table)
                    .col(Complaint::StudentId)
                    .col(Complaint::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: status (filters and statistics)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_status")
                    .table(Complaint::Table)
                    .col(Complaint::Status)
                    .to_owned(),
            )
            .await?;

        // Index: category
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_category")
                    .table(Complaint::Table)
                    .col(Complaint::Category)
                    .to_owned(),
            )
            .await?;

        // Index: priority
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_priority")
                    .table(Complaint::Table)
                    .col(Complaint::Priority)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (staff list, newest first)
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
    Priority,
    Status,
    StudentId,
    AssignedTo,
    RoomNumber,
    Images,
    Resolution,
    ResolvedAt,
    ResolvedBy,
    CreatedAt,
    UpdatedAt,
}
