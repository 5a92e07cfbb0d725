use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Customers: listing order (last_name, first_name)
        manager
            .create_index(
                Index::create()
                    .name("idx_customers_name")
                    .table(Customers::Table)
                    .col(Customers::LastName)
                    .col(Customers::FirstName)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Reservations: per-customer listing ordered by start_at, and the ranking join
        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_customer_start")
                    .table(Reservations::Table)
                    .col(Reservations::CustomerId)
                    .col(Reservations::StartAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_reservations_customer_start").table(Reservations::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_customers_name").table(Customers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Customers { Table, FirstName, LastName }

#[derive(DeriveIden)]
enum Reservations { Table, CustomerId, StartAt }
