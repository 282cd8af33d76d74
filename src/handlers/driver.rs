use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{mileage_record, vehicle};
use crate::error::{AppError, AppResult};
use crate::handlers::AppJson;
use crate::services::ingestion::{ingest, validate_mileage};
use crate::services::visibility::{can_see_vehicle, visible_vehicles, VehicleScope};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitMileageRequest {
    pub vehicle_id: Uuid,
    /// Wide type so that negative readings reach validation instead of failing to parse
    pub mileage: i64,
}

#[derive(Debug, Serialize)]
pub struct SubmitMileageResponse {
    pub record: mileage_record::Model,
    pub vehicle_id: Uuid,
    pub current_mileage: i32,
}

#[derive(Debug, Serialize)]
pub struct MileageEntry {
    pub id: i32,
    pub vehicle_id: Uuid,
    pub plate: Option<String>,
    pub mileage: i32,
    pub recorded_at: DateTime<Utc>,
}

/// Vehicles the logged-in driver may report mileage for
pub async fn my_vehicles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<vehicle::Model>>> {
    let scope = VehicleScope::for_viewer(claims.sub, claims.role);
    Ok(Json(visible_vehicles(state.db.as_ref(), scope).await?))
}

/// Submit an odometer reading
pub async fn submit_mileage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<SubmitMileageRequest>,
) -> AppResult<Json<SubmitMileageResponse>> {
    let mileage = validate_mileage(payload.mileage)?;

    let scope = VehicleScope::for_viewer(claims.sub, claims.role);
    if !can_see_vehicle(state.db.as_ref(), scope, payload.vehicle_id).await? {
        return Err(AppError::Forbidden(
            "You are not assigned to this vehicle".to_string(),
        ));
    }

    let ingestion = ingest(
        state.db.as_ref(),
        state.events.as_ref(),
        payload.vehicle_id,
        Some(claims.sub),
        mileage,
    )
    .await?;

    Ok(Json(SubmitMileageResponse {
        vehicle_id: ingestion.vehicle.id,
        current_mileage: ingestion.vehicle.current_mileage,
        record: ingestion.record,
    }))
}

/// Readings submitted by the logged-in driver, most recent first
pub async fn my_mileage_records(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<MileageEntry>>> {
    let records = mileage_record::Entity::find()
        .filter(mileage_record::Column::DriverId.eq(claims.sub))
        .order_by_desc(mileage_record::Column::RecordedAt)
        .find_also_related(vehicle::Entity)
        .all(state.db.as_ref())
        .await?;

    let entries = records
        .into_iter()
        .map(|(r, v)| MileageEntry {
            id: r.id,
            vehicle_id: r.vehicle_id,
            plate: v.map(|v| v.plate),
            mileage: r.mileage,
            recorded_at: r.recorded_at.with_timezone(&Utc),
        })
        .collect();

    Ok(Json(entries))
}
