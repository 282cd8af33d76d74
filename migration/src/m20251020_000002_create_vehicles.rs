use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(uuid(Vehicle::Id).primary_key())
                    .col(string_len(Vehicle::Plate, 10).not_null().unique_key())
                    .col(string_len(Vehicle::Make, 50).not_null())
                    .col(string_len(Vehicle::ModelName, 50).not_null())
                    .col(
                        integer(Vehicle::Year)
                            .not_null()
                            .check(Expr::col(Vehicle::Year).gte(0)),
                    )
                    .col(
                        integer(Vehicle::CurrentMileage)
                            .not_null()
                            .default(0)
                            .check(Expr::col(Vehicle::CurrentMileage).gte(0)),
                    )
                    .col(
                        integer(Vehicle::MaintenanceIntervalKm)
                            .not_null()
                            .default(10_000)
                            .check(Expr::col(Vehicle::MaintenanceIntervalKm).gt(0)),
                    )
                    .col(
                        timestamp_with_time_zone(Vehicle::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vehicle {
    Table,
    Id,
    Plate,
    Make,
    ModelName,
    Year,
    CurrentMileage,
    MaintenanceIntervalKm,
    CreatedAt,
}
