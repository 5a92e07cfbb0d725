//! Create `customers` table.
//!
//! Notes are never NULL; an empty string stands for "no notes".
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(pk_auto(Customers::Id))
                    .col(text(Customers::FirstName).not_null())
                    .col(text_null(Customers::MiddleName))
                    .col(text(Customers::LastName).not_null())
                    .col(text(Customers::Phone).not_null())
                    .col(text(Customers::Notes).not_null().default(""))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Customers::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Customers { Table, Id, FirstName, MiddleName, LastName, Phone, Notes }
