//! Migration to create the class_sessions table.
//!
//! Class identity is (name, weekday, start_time); the composite unique index
//! enforces it at the storage layer.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClassSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassSessions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClassSessions::Name).text().not_null())
                    .col(
                        ColumnDef::new(ClassSessions::Weekday)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClassSessions::StartTime).time().not_null())
                    .col(
                        ColumnDef::new(ClassSessions::Capacity)
                            .integer()
                            .not_null()
                            .default(20),
                    )
                    .col(ColumnDef::new(ClassSessions::TrainerId).uuid().null())
                    .col(
                        ColumnDef::new(ClassSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_sessions_trainer_id")
                            .from(ClassSessions::Table, ClassSessions::TrainerId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_class_sessions_identity")
                    .table(ClassSessions::Table)
                    .col(ClassSessions::Name)
                    .col(ClassSessions::Weekday)
                    .col(ClassSessions::StartTime)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_class_sessions_identity")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ClassSessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClassSessions {
    Table,
    Id,
    Name,
    Weekday,
    StartTime,
    Capacity,
    TrainerId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
}
