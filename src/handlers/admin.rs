use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::UserRole;
use crate::entities::vehicle::DEFAULT_MAINTENANCE_INTERVAL_KM;
use crate::entities::{user, vehicle, vehicle_driver};
use crate::error::{AppError, AppResult};
use crate::handlers::AppJson;
use crate::AppState;

const MAX_PLATE_LEN: usize = 10;

// ============ Vehicle Management ============

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub plate: String,
    pub make: String,
    pub model_name: String,
    pub year: i32,
    pub current_mileage: Option<i32>,
    pub maintenance_interval_km: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub plate: Option<String>,
    pub make: Option<String>,
    pub model_name: Option<String>,
    pub year: Option<i32>,
    pub maintenance_interval_km: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct DriverInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    #[serde(flatten)]
    pub vehicle: vehicle::Model,
    pub assigned_drivers: Vec<DriverInfo>,
}

pub fn normalize_plate(plate: &str) -> AppResult<String> {
    let plate = plate.trim().to_uppercase();

    if plate.is_empty() {
        return Err(AppError::Validation("Plate is required".to_string()));
    }
    if plate.chars().count() > MAX_PLATE_LEN {
        return Err(AppError::Validation(format!(
            "Plate must be at most {} characters",
            MAX_PLATE_LEN
        )));
    }

    Ok(plate)
}

pub fn validate_year(year: i32) -> AppResult<i32> {
    if year < 0 {
        return Err(AppError::Validation("Year must be non-negative".to_string()));
    }
    Ok(year)
}

pub fn validate_interval(interval: i32) -> AppResult<i32> {
    if interval <= 0 {
        return Err(AppError::Validation(
            "Maintenance interval must be positive".to_string(),
        ));
    }
    Ok(interval)
}

async fn ensure_plate_free(state: &AppState, plate: &str, except: Option<Uuid>) -> AppResult<()> {
    let existing = vehicle::Entity::find()
        .filter(vehicle::Column::Plate.eq(plate))
        .one(state.db.as_ref())
        .await?;

    match existing {
        Some(v) if Some(v.id) != except => Err(AppError::Conflict(plate_taken(plate))),
        _ => Ok(()),
    }
}

fn plate_taken(plate: &str) -> String {
    format!("A vehicle with plate {} already exists", plate)
}

/// List all vehicles with their assigned drivers (admin)
pub async fn list_vehicles(State(state): State<AppState>) -> AppResult<Json<Vec<VehicleResponse>>> {
    let vehicles = vehicle::Entity::find()
        .order_by_asc(vehicle::Column::Plate)
        .find_with_related(user::Entity)
        .all(state.db.as_ref())
        .await?;

    let responses = vehicles
        .into_iter()
        .map(|(v, drivers)| VehicleResponse {
            vehicle: v,
            assigned_drivers: drivers
                .into_iter()
                .map(|d| DriverInfo {
                    id: d.id,
                    name: d.name,
                    email: d.email,
                })
                .collect(),
        })
        .collect();

    Ok(Json(responses))
}

/// Create a new vehicle (admin)
pub async fn create_vehicle(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateVehicleRequest>,
) -> AppResult<Json<vehicle::Model>> {
    let plate = normalize_plate(&payload.plate)?;
    let year = validate_year(payload.year)?;
    let interval =
        validate_interval(payload.maintenance_interval_km.unwrap_or(DEFAULT_MAINTENANCE_INTERVAL_KM))?;
    let current_mileage = payload.current_mileage.unwrap_or(0);
    if current_mileage < 0 {
        return Err(AppError::Validation(
            "Current mileage must be non-negative".to_string(),
        ));
    }

    ensure_plate_free(&state, &plate, None).await?;

    let vehicle = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        plate: Set(plate.clone()),
        make: Set(payload.make),
        model_name: Set(payload.model_name),
        year: Set(year),
        current_mileage: Set(current_mileage),
        maintenance_interval_km: Set(interval),
        ..Default::default()
    };

    // The plate check above can race with another insert; the unique index decides
    let result = vehicle
        .insert(state.db.as_ref())
        .await
        .map_err(|e| AppError::from_unique_violation(e, plate_taken(&plate)))?;
    tracing::info!(vehicle_id = %result.id, plate = %result.plate, "Vehicle created");
    Ok(Json(result))
}

/// Update a vehicle's registration data (admin). Mileage only changes through readings.
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateVehicleRequest>,
) -> AppResult<Json<vehicle::Model>> {
    let vehicle = vehicle::Entity::find_by_id(id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let mut active: vehicle::ActiveModel = vehicle.into();
    let mut new_plate = None;

    if let Some(plate) = payload.plate {
        let plate = normalize_plate(&plate)?;
        ensure_plate_free(&state, &plate, Some(id)).await?;
        active.plate = Set(plate.clone());
        new_plate = Some(plate);
    }

    if let Some(make) = payload.make {
        active.make = Set(make);
    }

    if let Some(model_name) = payload.model_name {
        active.model_name = Set(model_name);
    }

    if let Some(year) = payload.year {
        active.year = Set(validate_year(year)?);
    }

    if let Some(interval) = payload.maintenance_interval_km {
        active.maintenance_interval_km = Set(validate_interval(interval)?);
    }

    let result = active.update(state.db.as_ref()).await.map_err(|e| match &new_plate {
        Some(plate) => AppError::from_unique_violation(e, plate_taken(plate)),
        None => AppError::Database(e),
    })?;
    Ok(Json(result))
}

/// Delete a vehicle together with its maintenance and mileage history (admin)
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = vehicle::Entity::delete_by_id(id).exec(state.db.as_ref()).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Vehicle not found".to_string()));
    }

    tracing::info!(vehicle_id = %id, "Vehicle deleted with its history");
    Ok(Json(serde_json::json!({ "message": "Vehicle deleted" })))
}

/// Assign a driver to a vehicle (admin)
pub async fn assign_driver(
    State(state): State<AppState>,
    Path((vehicle_id, driver_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    let driver = user::Entity::find_by_id(driver_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;

    if driver.role != Some(UserRole::Driver) {
        return Err(AppError::BadRequest("User is not a driver".to_string()));
    }

    vehicle::Entity::find_by_id(vehicle_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let existing = vehicle_driver::Entity::find_by_id((vehicle_id, driver_id))
        .one(state.db.as_ref())
        .await?;

    if existing.is_none() {
        vehicle_driver::ActiveModel {
            vehicle_id: Set(vehicle_id),
            user_id: Set(driver_id),
        }
        .insert(state.db.as_ref())
        .await?;
    }

    Ok(Json(serde_json::json!({ "message": "Driver assigned" })))
}

/// Remove a driver from a vehicle (admin)
pub async fn unassign_driver(
    State(state): State<AppState>,
    Path((vehicle_id, driver_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    let result = vehicle_driver::Entity::delete_by_id((vehicle_id, driver_id))
        .exec(state.db.as_ref())
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Assignment not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Driver unassigned" })))
}

// ============ User Management ============

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Option<UserRole>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            created_at: u.created_at.with_timezone(&Utc),
        }
    }
}

/// List all users (admin)
pub async fn list_all_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::Email)
        .all(state.db.as_ref())
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<UserRole>,
}

/// Update user role (admin). `null` removes the account from every group.
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = user::Entity::find_by_id(user_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Only drivers may hold vehicle assignments
    if user.role == Some(UserRole::Driver) && payload.role != Some(UserRole::Driver) {
        vehicle_driver::Entity::delete_many()
            .filter(vehicle_driver::Column::UserId.eq(user_id))
            .exec(state.db.as_ref())
            .await?;
    }

    let mut active: user::ActiveModel = user.into();
    active.role = Set(payload.role);
    let updated = active.update(state.db.as_ref()).await?;

    tracing::info!(user_id = %updated.id, role = ?updated.role, "User role changed");
    Ok(Json(UserResponse::from(updated)))
}

/// Delete any user account (admin). History records keep existing with the
/// mechanic or driver reference cleared.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = user::Entity::delete_by_id(id).exec(state.db.as_ref()).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}
