//! Migration to create the routines table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Routines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Routines::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Routines::MemberId).uuid().not_null())
                    .col(ColumnDef::new(Routines::TrainerId).uuid().null())
                    .col(ColumnDef::new(Routines::Name).text().not_null())
                    .col(ColumnDef::new(Routines::Description).text().not_null())
                    .col(
                        ColumnDef::new(Routines::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Routines::AssignedDate).date().not_null())
                    .col(
                        ColumnDef::new(Routines::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_routines_member_id")
                            .from(Routines::Table, Routines::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_routines_trainer_id")
                            .from(Routines::Table, Routines::TrainerId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_routines_member_id")
                    .table(Routines::Table)
                    .col(Routines::MemberId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_routines_member_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Routines::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Routines {
    Table,
    Id,
    MemberId,
    TrainerId,
    Name,
    Description,
    Active,
    AssignedDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
}
