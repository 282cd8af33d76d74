use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "maintenance_type")]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceType {
    #[sea_orm(string_value = "preventive")]
    Preventive,
    #[sea_orm(string_value = "corrective")]
    Corrective,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_record")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub vehicle_id: Uuid,
    pub maintenance_type: MaintenanceType,
    pub date: Date,
    pub description: String,
    pub mileage_at_maintenance: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub parts_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub labor_cost: Decimal,
    pub mechanic_id: Option<Uuid>,
}

impl Model {
    pub fn total_cost(&self) -> Decimal {
        self.parts_cost + self.labor_cost
    }

    pub fn is_preventive(&self) -> bool {
        self.maintenance_type == MaintenanceType::Preventive
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::MechanicId",
        to = "super::user::Column::Id"
    )]
    Mechanic,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mechanic.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
