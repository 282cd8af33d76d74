use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "mechanic")]
    Mechanic,
    #[sea_orm(string_value = "driver")]
    Driver,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    /// `None` for accounts that belong to no group yet.
    pub role: Option<UserRole>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vehicle_driver::Entity")]
    VehicleAssignments,
    #[sea_orm(has_many = "super::maintenance_record::Entity")]
    MaintenanceRecords,
    #[sea_orm(has_many = "super::mileage_record::Entity")]
    MileageRecords,
}

impl Related<super::vehicle_driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleAssignments.def()
    }
}

impl Related<super::mileage_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MileageRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
