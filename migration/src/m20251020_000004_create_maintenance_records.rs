use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20251020_000001_create_users::User;
use super::m20251020_000002_create_vehicles::Vehicle;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(MaintenanceType::Enum)
                    .values([MaintenanceType::Preventive, MaintenanceType::Corrective])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MaintenanceRecord::Table)
                    .if_not_exists()
                    .col(pk_auto(MaintenanceRecord::Id))
                    .col(uuid(MaintenanceRecord::VehicleId).not_null())
                    .col(
                        ColumnDef::new(MaintenanceRecord::MaintenanceType)
                            .custom(MaintenanceType::Enum)
                            .not_null(),
                    )
                    .col(date(MaintenanceRecord::Date).not_null())
                    .col(text(MaintenanceRecord::Description).not_null().default(""))
                    .col(
                        integer(MaintenanceRecord::MileageAtMaintenance)
                            .not_null()
                            .check(Expr::col(MaintenanceRecord::MileageAtMaintenance).gte(0)),
                    )
                    .col(
                        decimal_len(MaintenanceRecord::PartsCost, 10, 2)
                            .not_null()
                            .default(0)
                            .check(Expr::col(MaintenanceRecord::PartsCost).gte(0)),
                    )
                    .col(
                        decimal_len(MaintenanceRecord::LaborCost, 10, 2)
                            .not_null()
                            .default(0)
                            .check(Expr::col(MaintenanceRecord::LaborCost).gte(0)),
                    )
                    .col(uuid_null(MaintenanceRecord::MechanicId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_record_vehicle")
                            .from(MaintenanceRecord::Table, MaintenanceRecord::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_record_mechanic")
                            .from(MaintenanceRecord::Table, MaintenanceRecord::MechanicId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_record_vehicle_date")
                    .table(MaintenanceRecord::Table)
                    .col(MaintenanceRecord::VehicleId)
                    .col(MaintenanceRecord::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MaintenanceRecord::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(MaintenanceType::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum MaintenanceRecord {
    Table,
    Id,
    VehicleId,
    MaintenanceType,
    Date,
    Description,
    MileageAtMaintenance,
    PartsCost,
    LaborCost,
    MechanicId,
}

#[derive(DeriveIden)]
pub enum MaintenanceType {
    #[sea_orm(iden = "maintenance_type")]
    Enum,
    #[sea_orm(iden = "preventive")]
    Preventive,
    #[sea_orm(iden = "corrective")]
    Corrective,
}
