use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAINTENANCE_INTERVAL_KM: i32 = 10_000;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub plate: String,
    pub make: String,
    pub model_name: String,
    pub year: i32,
    /// High-water mark of every odometer reading ingested for this vehicle.
    pub current_mileage: i32,
    pub maintenance_interval_km: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vehicle_driver::Entity")]
    Assignments,
    #[sea_orm(has_many = "super::maintenance_record::Entity")]
    MaintenanceRecords,
    #[sea_orm(has_many = "super::mileage_record::Entity")]
    MileageRecords,
}

impl Related<super::vehicle_driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::maintenance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceRecords.def()
    }
}

impl Related<super::mileage_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MileageRecords.def()
    }
}

/// Assigned drivers, through the `vehicle_driver` join table.
impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::vehicle_driver::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::vehicle_driver::Relation::Vehicle.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
