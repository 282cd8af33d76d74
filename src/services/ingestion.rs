//! Odometer readings and the vehicle mileage ratchet.
//!
//! Every reading is stored as reported. The vehicle's `current_mileage` only
//! moves up: the row is locked for the length of the transaction and the
//! update is additionally guarded by `current_mileage < reading`, so two
//! concurrent submissions can never leave the lower value behind.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{mileage_record, vehicle};
use crate::error::{AppError, AppResult};
use crate::services::events::FleetEvents;

/// The stored reading together with the vehicle as committed.
#[derive(Debug, Clone, Serialize)]
pub struct Ingestion {
    pub record: mileage_record::Model,
    pub vehicle: vehicle::Model,
}

pub fn validate_mileage(value: i64) -> AppResult<i32> {
    if value < 0 {
        return Err(AppError::Validation(
            "Mileage must be a non-negative integer".to_string(),
        ));
    }

    i32::try_from(value)
        .map_err(|_| AppError::Validation(format!("Mileage {} is out of range", value)))
}

/// New current mileage for a vehicle, if `reading` raises it.
pub fn ratchet(current: i32, reading: i32) -> Option<i32> {
    (reading > current).then_some(reading)
}

pub async fn ingest(
    db: &DatabaseConnection,
    events: &dyn FleetEvents,
    vehicle_id: Uuid,
    driver_id: Option<Uuid>,
    mileage: i32,
) -> AppResult<Ingestion> {
    let txn = db.begin().await?;

    let mut vehicle = vehicle::Entity::find_by_id(vehicle_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let record = mileage_record::ActiveModel {
        vehicle_id: Set(vehicle_id),
        driver_id: Set(driver_id),
        recorded_at: Set(Utc::now().into()),
        mileage: Set(mileage),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let previous = vehicle.current_mileage;
    if let Some(raised) = ratchet(previous, mileage) {
        vehicle::Entity::update_many()
            .col_expr(vehicle::Column::CurrentMileage, Expr::value(raised))
            .filter(vehicle::Column::Id.eq(vehicle_id))
            .filter(vehicle::Column::CurrentMileage.lt(raised))
            .exec(&txn)
            .await?;
        vehicle.current_mileage = raised;
    }

    txn.commit().await?;

    events.mileage_ingested(&record, previous, vehicle.current_mileage);

    Ok(Ingestion { record, vehicle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_mileage_is_rejected() {
        assert!(matches!(validate_mileage(-1), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_mileage_out_of_range_is_rejected() {
        assert!(matches!(
            validate_mileage(i64::from(i32::MAX) + 1),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_valid_mileage() {
        assert_eq!(validate_mileage(0).unwrap(), 0);
        assert_eq!(validate_mileage(59_500).unwrap(), 59_500);
    }

    #[test]
    fn test_ratchet_only_moves_up() {
        assert_eq!(ratchet(0, 59_500), Some(59_500));
        assert_eq!(ratchet(59_500, 40_000), None);
        assert_eq!(ratchet(59_500, 59_500), None);
    }

    #[test]
    fn test_ratchet_sequence_ends_at_maximum() {
        let initial = 1_200;
        let readings = [900, 5_000, 4_999, 12_000, 0, 11_500];

        let last = readings
            .iter()
            .fold(initial, |current, &r| ratchet(current, r).unwrap_or(current));

        assert_eq!(last, *readings.iter().max().unwrap().max(&initial));
    }
}
