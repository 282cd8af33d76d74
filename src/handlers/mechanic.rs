use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use sea_orm::{
    prelude::Decimal, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::maintenance_record::{self, MaintenanceType};
use crate::entities::{user, vehicle};
use crate::error::{AppError, AppResult};
use crate::handlers::AppJson;
use crate::services::visibility::{has_capability, visible_vehicles, Capability, VehicleScope};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMaintenanceRequest {
    pub vehicle_id: Uuid,
    pub maintenance_type: MaintenanceType,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    pub mileage_at_maintenance: i32,
    pub parts_cost: Option<Decimal>,
    pub labor_cost: Option<Decimal>,
    /// Defaults to the caller
    pub mechanic_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMaintenanceRequest {
    pub maintenance_type: Option<MaintenanceType>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub mileage_at_maintenance: Option<i32>,
    pub parts_cost: Option<Decimal>,
    pub labor_cost: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    #[serde(flatten)]
    pub record: maintenance_record::Model,
    pub total_cost: Decimal,
    pub mechanic_name: Option<String>,
}

impl MaintenanceResponse {
    fn new(record: maintenance_record::Model, mechanic: Option<&user::Model>) -> Self {
        Self {
            total_cost: record.total_cost(),
            mechanic_name: mechanic.map(|m| m.name.clone()),
            record,
        }
    }
}

fn validate_cost(cost: Decimal, field: &str) -> AppResult<Decimal> {
    if cost < Decimal::ZERO {
        return Err(AppError::Validation(format!("{} must be non-negative", field)));
    }
    Ok(cost)
}

fn validate_service_mileage(mileage: i32) -> AppResult<i32> {
    if mileage < 0 {
        return Err(AppError::Validation(
            "Mileage at maintenance must be non-negative".to_string(),
        ));
    }
    Ok(mileage)
}

/// Only accounts that may record maintenance can be named as responsible for it.
fn ensure_responsible_mechanic(account: &user::Model) -> AppResult<()> {
    if !has_capability(account.role, Capability::AddMaintenanceRecord) {
        return Err(AppError::Validation(format!(
            "{} cannot be the responsible mechanic",
            account.email
        )));
    }
    Ok(())
}

/// List the whole fleet (mechanics and admins)
pub async fn list_vehicles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<vehicle::Model>>> {
    let scope = VehicleScope::for_viewer(claims.sub, claims.role);
    Ok(Json(visible_vehicles(state.db.as_ref(), scope).await?))
}

/// List maintenance records, most recent first
pub async fn list_records(State(state): State<AppState>) -> AppResult<Json<Vec<MaintenanceResponse>>> {
    let records = maintenance_record::Entity::find()
        .order_by_desc(maintenance_record::Column::Date)
        .order_by_desc(maintenance_record::Column::Id)
        .find_also_related(user::Entity)
        .all(state.db.as_ref())
        .await?;

    Ok(Json(
        records
            .into_iter()
            .map(|(r, m)| MaintenanceResponse::new(r, m.as_ref()))
            .collect(),
    ))
}

/// Maintenance history of one vehicle, most recent first
pub async fn vehicle_history(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> AppResult<Json<Vec<MaintenanceResponse>>> {
    vehicle::Entity::find_by_id(vehicle_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let records = maintenance_record::Entity::find()
        .filter(maintenance_record::Column::VehicleId.eq(vehicle_id))
        .order_by_desc(maintenance_record::Column::Date)
        .order_by_desc(maintenance_record::Column::Id)
        .find_also_related(user::Entity)
        .all(state.db.as_ref())
        .await?;

    Ok(Json(
        records
            .into_iter()
            .map(|(r, m)| MaintenanceResponse::new(r, m.as_ref()))
            .collect(),
    ))
}

/// Record a maintenance event
pub async fn create_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateMaintenanceRequest>,
) -> AppResult<Json<MaintenanceResponse>> {
    let mileage = validate_service_mileage(payload.mileage_at_maintenance)?;
    let parts_cost = validate_cost(payload.parts_cost.unwrap_or_default(), "Parts cost")?;
    let labor_cost = validate_cost(payload.labor_cost.unwrap_or_default(), "Labor cost")?;

    vehicle::Entity::find_by_id(payload.vehicle_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid vehicle".to_string()))?;

    let mechanic_id = payload.mechanic_id.unwrap_or(claims.sub);
    let mechanic = user::Entity::find_by_id(mechanic_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid mechanic".to_string()))?;
    ensure_responsible_mechanic(&mechanic)?;

    let record = maintenance_record::ActiveModel {
        vehicle_id: Set(payload.vehicle_id),
        maintenance_type: Set(payload.maintenance_type),
        date: Set(payload.date),
        description: Set(payload.description),
        mileage_at_maintenance: Set(mileage),
        parts_cost: Set(parts_cost),
        labor_cost: Set(labor_cost),
        mechanic_id: Set(Some(mechanic.id)),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await?;

    tracing::info!(
        record_id = record.id,
        vehicle_id = %record.vehicle_id,
        kind = ?record.maintenance_type,
        mileage = record.mileage_at_maintenance,
        "Maintenance recorded"
    );

    Ok(Json(MaintenanceResponse::new(record, Some(&mechanic))))
}

/// Correct a maintenance record
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateMaintenanceRequest>,
) -> AppResult<Json<MaintenanceResponse>> {
    let record = maintenance_record::Entity::find_by_id(id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Maintenance record not found".to_string()))?;

    let mut active: maintenance_record::ActiveModel = record.into();

    if let Some(kind) = payload.maintenance_type {
        active.maintenance_type = Set(kind);
    }

    if let Some(date) = payload.date {
        active.date = Set(date);
    }

    if let Some(description) = payload.description {
        active.description = Set(description);
    }

    if let Some(mileage) = payload.mileage_at_maintenance {
        active.mileage_at_maintenance = Set(validate_service_mileage(mileage)?);
    }

    if let Some(cost) = payload.parts_cost {
        active.parts_cost = Set(validate_cost(cost, "Parts cost")?);
    }

    if let Some(cost) = payload.labor_cost {
        active.labor_cost = Set(validate_cost(cost, "Labor cost")?);
    }

    let updated = active.update(state.db.as_ref()).await?;

    let mechanic = match updated.mechanic_id {
        Some(mechanic_id) => user::Entity::find_by_id(mechanic_id).one(state.db.as_ref()).await?,
        None => None,
    };

    Ok(Json(MaintenanceResponse::new(updated, mechanic.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;

    #[test]
    fn test_negative_costs_are_rejected() {
        assert!(validate_cost(Decimal::new(-1, 2), "Parts cost").is_err());
        assert_eq!(
            validate_cost(Decimal::new(15050, 2), "Parts cost").unwrap(),
            Decimal::new(15050, 2)
        );
        assert!(validate_cost(Decimal::ZERO, "Labor cost").is_ok());
    }

    fn account(role: Option<UserRole>) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: "someone@fleet.local".to_string(),
            password_hash: String::new(),
            name: "Someone".to_string(),
            role,
            created_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn test_responsible_mechanic_must_service_vehicles() {
        assert!(ensure_responsible_mechanic(&account(Some(UserRole::Mechanic))).is_ok());
        assert!(ensure_responsible_mechanic(&account(Some(UserRole::Admin))).is_ok());
        assert!(matches!(
            ensure_responsible_mechanic(&account(Some(UserRole::Driver))),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ensure_responsible_mechanic(&account(None)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_total_cost_is_parts_plus_labor() {
        let record = maintenance_record::Model {
            id: 1,
            vehicle_id: Uuid::new_v4(),
            maintenance_type: MaintenanceType::Corrective,
            date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            description: "Brake pads".to_string(),
            mileage_at_maintenance: 42_000,
            parts_cost: Decimal::new(35000, 2),
            labor_cost: Decimal::new(12050, 2),
            mechanic_id: None,
        };

        let response = MaintenanceResponse::new(record, None);
        assert_eq!(response.total_cost, Decimal::new(47050, 2));
        assert_eq!(response.mechanic_name, None);
    }
}
