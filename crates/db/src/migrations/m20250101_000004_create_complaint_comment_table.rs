//! Create complaint comment table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComplaintComment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintComment::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintComment::ComplaintId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplaintComment::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(ComplaintComment::Comment).text().not_null())
                    .col(
                        ColumnDef::new(ComplaintComment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_comment_complaint")
                            .from(ComplaintComment::Table, ComplaintComment::ComplaintId)
                            .to(Complaint::Table, Complaint::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: complaint_id + created_at (thread in insertion order)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_comment_complaint_id_created_at")
                    .table(ComplaintComment::Table)
                    .col(ComplaintComment::ComplaintId)
                    .col(ComplaintComment::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComplaintComment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ComplaintComment {
    Table,
    Id,
    ComplaintId,
    UserId,
    Comment,
    CreatedAt,
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
}
