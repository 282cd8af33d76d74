#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use sea_orm::{prelude::Decimal, DatabaseConnection, Statement};
use uuid::Uuid;

use fleet_maintenance_backend::entities::maintenance_record::{self, MaintenanceType};
use fleet_maintenance_backend::entities::user::UserRole;
use fleet_maintenance_backend::entities::{mileage_record, vehicle};
use fleet_maintenance_backend::services::events::FleetEvents;
use fleet_maintenance_backend::utils::jwt::create_token;
use fleet_maintenance_backend::{AppState, Config};

pub const JWT_SECRET: &str = "fleet-test-secret";

pub fn vehicle(plate: &str, interval: i32, current: i32) -> vehicle::Model {
    vehicle::Model {
        id: Uuid::new_v4(),
        plate: plate.to_string(),
        make: "Scania".to_string(),
        model_name: "R450".to_string(),
        year: 2020,
        current_mileage: current,
        maintenance_interval_km: interval,
        created_at: Utc::now().into(),
    }
}

pub fn preventive(id: i32, vehicle_id: Uuid, date: NaiveDate, mileage: i32) -> maintenance_record::Model {
    maintenance_record::Model {
        id,
        vehicle_id,
        maintenance_type: MaintenanceType::Preventive,
        date,
        description: "Scheduled service".to_string(),
        mileage_at_maintenance: mileage,
        parts_cost: Decimal::new(180_000, 2),
        labor_cost: Decimal::new(50_000, 2),
        mechanic_id: None,
    }
}

pub fn reading(id: i32, vehicle_id: Uuid, driver_id: Option<Uuid>, mileage: i32) -> mileage_record::Model {
    mileage_record::Model {
        id,
        vehicle_id,
        driver_id,
        recorded_at: Utc::now().into(),
        mileage,
    }
}

/// Collects events instead of logging them.
#[derive(Default)]
pub struct RecordingEvents {
    pub ingested: Mutex<Vec<(i32, i32, i32)>>,
    pub computed: Mutex<Vec<(usize, usize, usize)>>,
}

impl FleetEvents for RecordingEvents {
    fn mileage_ingested(&self, record: &mileage_record::Model, previous: i32, current: i32) {
        self.ingested.lock().unwrap().push((record.mileage, previous, current));
    }

    fn alerts_computed(&self, _viewer: Uuid, vehicles: usize, alerts: usize, overdue: usize) {
        self.computed.lock().unwrap().push((vehicles, alerts, overdue));
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration_hours: 1,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        admin_email: "admin@fleet.local".to_string(),
        admin_password: "admin123".to_string(),
        seed_demo_data: false,
    }
}

pub fn app_state(db: DatabaseConnection) -> AppState {
    AppState {
        db: Arc::new(db),
        config: test_config(),
        events: Arc::new(RecordingEvents::default()),
    }
}

/// `Authorization` header value for a fresh account with the given role.
pub fn bearer(user_id: Uuid, role: Option<UserRole>) -> String {
    let token = create_token(user_id, "someone@fleet.local", role, JWT_SECRET, 1).unwrap();
    format!("Bearer {}", token)
}

/// SELECT statements in the order they were sent, without BEGIN/COMMIT.
pub fn selects(statements: &[Statement]) -> Vec<&Statement> {
    statements
        .iter()
        .filter(|s| s.sql.starts_with("SELECT"))
        .collect()
}
