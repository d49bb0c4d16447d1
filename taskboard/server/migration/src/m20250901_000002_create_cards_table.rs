use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

use crate::m20250901_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

const DEFAULT_PRIORITY: &str = "Medium";
const FK_CARDS_TO_USERS: &str = "fk-cards-owner_id";
const IDX_CARDS_OWNER: &str = "idx-cards-owner_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cards::Table)
                    .if_not_exists()
                    .col(pk_auto(Cards::Id))
                    .col(string(Cards::Title))
                    .col(text_null(Cards::Description))
                    .col(date_null(Cards::DueDate))
                    .col(string_null(Cards::Assignee))
                    .col(string(Cards::BoardId))
                    .col(string(Cards::Priority).default(DEFAULT_PRIORITY))
                    .col(integer(Cards::OwnerId))
                    .col(
                        timestamp_with_time_zone(Cards::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Cards::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_CARDS_TO_USERS)
                            .from(Cards::Table, Cards::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_CARDS_OWNER)
                    .table(Cards::Table)
                    .col(Cards::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_CARDS_OWNER)
                    .table(Cards::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Cards::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cards {
    Table,
    Id,
    Title,
    Description,
    DueDate,
    Assignee,
    BoardId,
    Priority,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}
