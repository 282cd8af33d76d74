mod common;

use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
use uuid::Uuid;

use common::{reading, vehicle, RecordingEvents};
use fleet_maintenance_backend::entities::{mileage_record, vehicle};
use fleet_maintenance_backend::services::ingestion::ingest;
use fleet_maintenance_backend::AppError;

#[tokio::test]
async fn test_higher_reading_advances_vehicle() {
    let truck = vehicle("VOL1234", 10_000, 0);
    let driver = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![truck.clone()]])
        .append_query_results([vec![reading(1, truck.id, Some(driver), 59_500)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let events = RecordingEvents::default();
    let result = ingest(&db, &events, truck.id, Some(driver), 59_500).await.unwrap();

    assert_eq!(result.vehicle.current_mileage, 59_500);
    assert_eq!(result.record.mileage, 59_500);
    assert_eq!(result.record.driver_id, Some(driver));
    assert_eq!(*events.ingested.lock().unwrap(), vec![(59_500, 0, 59_500)]);
}

#[tokio::test]
async fn test_lower_reading_is_stored_but_vehicle_unchanged() {
    let truck = vehicle("VOL1234", 10_000, 59_500);

    // No exec result queued: a vehicle update would fail the test
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![truck.clone()]])
        .append_query_results([vec![reading(2, truck.id, None, 40_000)]])
        .into_connection();

    let events = RecordingEvents::default();
    let result = ingest(&db, &events, truck.id, None, 40_000).await.unwrap();

    assert_eq!(result.vehicle.current_mileage, 59_500);
    assert_eq!(result.record.mileage, 40_000);
    assert_eq!(*events.ingested.lock().unwrap(), vec![(40_000, 59_500, 59_500)]);
}

#[tokio::test]
async fn test_equal_reading_does_not_update_vehicle() {
    let truck = vehicle("SCA5678", 10_000, 68_000);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![truck.clone()]])
        .append_query_results([vec![reading(3, truck.id, None, 68_000)]])
        .into_connection();

    let result = ingest(&db, &RecordingEvents::default(), truck.id, None, 68_000)
        .await
        .unwrap();

    assert_eq!(result.vehicle.current_mileage, 68_000);
}

#[tokio::test]
async fn test_unknown_vehicle_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<vehicle::Model>::new()])
        .into_connection();

    let events = RecordingEvents::default();
    let result = ingest(&db, &events, Uuid::new_v4(), None, 1_000).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(events.ingested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_insert_surfaces_database_error() {
    let truck = vehicle("MER9012", 15_000, 14_000);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![truck.clone()]])
        .append_query_errors([DbErr::Custom("connection reset".to_string())])
        .into_connection();

    let events = RecordingEvents::default();
    let result = ingest(&db, &events, truck.id, None, 14_200).await;

    assert!(matches!(result, Err(AppError::Database(_))));
    assert!(events.ingested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_two_readings_keep_high_water_mark() {
    let driver = Uuid::new_v4();
    let fresh = vehicle("VOL1234", 10_000, 0);
    let mut advanced = fresh.clone();
    advanced.current_mileage = 59_500;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // First submission: 59_500 on a vehicle at 0
        .append_query_results([vec![fresh.clone()]])
        .append_query_results([vec![reading(1, fresh.id, Some(driver), 59_500)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        // Second submission: 40_000 on the same vehicle, now at 59_500
        .append_query_results([vec![advanced]])
        .append_query_results([vec![reading(2, fresh.id, Some(driver), 40_000)]])
        .into_connection();

    let events = RecordingEvents::default();
    let first = ingest(&db, &events, fresh.id, Some(driver), 59_500).await.unwrap();
    let second = ingest(&db, &events, fresh.id, Some(driver), 40_000).await.unwrap();

    assert_eq!(first.vehicle.current_mileage, 59_500);
    assert_eq!(second.vehicle.current_mileage, 59_500);

    let history: Vec<mileage_record::Model> = vec![first.record, second.record];
    let values: Vec<i32> = history.iter().map(|r| r.mileage).collect();
    assert_eq!(values, vec![59_500, 40_000]);
}
