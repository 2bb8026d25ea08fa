use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bus::Table)
                    .if_not_exists()
                    .col(uuid(Bus::Id).primary_key())
                    .col(string_len(Bus::BusNumber, 50).not_null())
                    .col(string_len(Bus::Operator, 100).not_null())
                    .col(string_len(Bus::FromCity, 100).not_null())
                    .col(string_len(Bus::ToCity, 100).not_null())
                    .col(timestamp_with_time_zone(Bus::DepartureTime).not_null())
                    .col(timestamp_with_time_zone(Bus::ArrivalTime).not_null())
                    .col(boolean(Bus::IsAc).not_null())
                    .col(string_len(Bus::Image, 500).not_null())
                    // The full seat grid lives inside the bus row, mirroring
                    // the embedded-document shape the booking flow expects.
                    .col(json(Bus::Seats).not_null())
                    .col(double(Bus::Price).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bus::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Bus {
    Table,
    Id,
    BusNumber,
    Operator,
    FromCity,
    ToCity,
    DepartureTime,
    ArrivalTime,
    IsAc,
    Image,
    Seats,
    Price,
}
