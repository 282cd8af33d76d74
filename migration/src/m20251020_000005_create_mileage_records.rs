use sea_orm_migration::{prelude::*, schema::*};

use super::m20251020_000001_create_users::User;
use super::m20251020_000002_create_vehicles::Vehicle;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MileageRecord::Table)
                    .if_not_exists()
                    .col(pk_auto(MileageRecord::Id))
                    .col(uuid(MileageRecord::VehicleId).not_null())
                    .col(uuid_null(MileageRecord::DriverId))
                    .col(
                        timestamp_with_time_zone(MileageRecord::RecordedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        integer(MileageRecord::Mileage)
                            .not_null()
                            .check(Expr::col(MileageRecord::Mileage).gte(0)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mileage_record_vehicle")
                            .from(MileageRecord::Table, MileageRecord::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mileage_record_driver")
                            .from(MileageRecord::Table, MileageRecord::DriverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MileageRecord::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum MileageRecord {
    Table,
    Id,
    VehicleId,
    DriverId,
    RecordedAt,
    Mileage,
}
