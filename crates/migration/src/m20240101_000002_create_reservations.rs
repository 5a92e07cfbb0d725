//! Create `reservations` table with FK to `customers`.
//!
//! Party size is also guarded by a CHECK so rows written outside the service stay loadable.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(pk_auto(Reservations::Id))
                    .col(integer(Reservations::CustomerId).not_null())
                    .col(timestamp_with_time_zone(Reservations::StartAt).not_null())
                    .col(
                        integer(Reservations::NumGuests)
                            .not_null()
                            .check(Expr::col(Reservations::NumGuests).gte(1)),
                    )
                    .col(text(Reservations::Notes).not_null().default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_customer")
                            .from(Reservations::Table, Reservations::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Reservations::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Reservations { Table, Id, CustomerId, StartAt, NumGuests, Notes }

#[derive(DeriveIden)]
enum Customers { Table, Id }
