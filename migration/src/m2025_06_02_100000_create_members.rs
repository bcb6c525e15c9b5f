//! Migration to create the members table.
//!
//! Member accounts carry their role as a first-class column so an identity
//! can never exist without a role. Accounts are deactivated, never deleted.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Members::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Members::Username).text().not_null())
                    .col(ColumnDef::new(Members::Email).text().not_null())
                    .col(ColumnDef::new(Members::PasswordHash).text().not_null())
                    .col(ColumnDef::new(Members::FirstName).text().null())
                    .col(ColumnDef::new(Members::LastName).text().null())
                    .col(ColumnDef::new(Members::Phone).text().null())
                    .col(ColumnDef::new(Members::BirthDate).date().null())
                    .col(
                        ColumnDef::new(Members::Role)
                            .string_len(16)
                            .not_null()
                            .default("member"),
                    )
                    .col(
                        ColumnDef::new(Members::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Members::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_members_username")
                    .table(Members::Table)
                    .col(Members::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_members_username").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Phone,
    BirthDate,
    Role,
    Active,
    CreatedAt,
}
