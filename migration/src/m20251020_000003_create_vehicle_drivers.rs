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
                    .table(VehicleDriver::Table)
                    .if_not_exists()
                    .col(uuid(VehicleDriver::VehicleId).not_null())
                    .col(uuid(VehicleDriver::UserId).not_null())
                    .primary_key(
                        Index::create()
                            .col(VehicleDriver::VehicleId)
                            .col(VehicleDriver::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_driver_vehicle")
                            .from(VehicleDriver::Table, VehicleDriver::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_driver_user")
                            .from(VehicleDriver::Table, VehicleDriver::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Drivers look up their own assignments on every dashboard load
        manager
            .create_index(
                Index::create()
                    .name("idx_vehicle_driver_user")
                    .table(VehicleDriver::Table)
                    .col(VehicleDriver::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehicleDriver::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VehicleDriver {
    Table,
    VehicleId,
    UserId,
}
