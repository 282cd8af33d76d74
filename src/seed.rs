//! Startup data: the bootstrap admin and an optional demo fleet.

use chrono::NaiveDate;
use sea_orm::{
    prelude::Decimal, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::config::Config;
use crate::entities::maintenance_record::{self, MaintenanceType};
use crate::entities::user::{self, UserRole};
use crate::entities::{vehicle, vehicle_driver};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::hash_password;
use crate::services::events::FleetEvents;
use crate::services::ingestion::ingest;

const DEMO_PASSWORD: &str = "fleet-demo-2025";

async fn ensure_user<C: ConnectionTrait>(
    db: &C,
    email: &str,
    name: &str,
    role: UserRole,
    password: &str,
) -> AppResult<user::Model> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;

    if let Some(user) = existing {
        return Ok(user);
    }

    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        name: Set(name.to_string()),
        role: Set(Some(role)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(email = %user.email, ?role, "Seeded account");
    Ok(user)
}

/// Seed the admin account if it doesn't exist
pub async fn seed_admin(db: &DatabaseConnection, config: &Config) -> AppResult<()> {
    ensure_user(db, &config.admin_email, "Admin", UserRole::Admin, &config.admin_password).await?;
    Ok(())
}

fn date(y: i32, m: u32, d: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| AppError::Internal(format!("Invalid seed date {}-{}-{}", y, m, d)))
}

/// Three trucks with history: one due soon, one overdue, one fine.
/// Does nothing when the demo fleet is already present.
pub async fn seed_demo_fleet(db: &DatabaseConnection, events: &dyn FleetEvents) -> AppResult<()> {
    let already_seeded = vehicle::Entity::find()
        .filter(vehicle::Column::Plate.eq("VOL1234"))
        .one(db)
        .await?
        .is_some();

    if already_seeded {
        tracing::debug!("Demo fleet already present");
        return Ok(());
    }

    let txn = db.begin().await?;

    let mechanic = ensure_user(&txn, "mechanic@fleet.local", "Chief Mechanic", UserRole::Mechanic, DEMO_PASSWORD).await?;
    let driver = ensure_user(&txn, "driver@fleet.local", "Jose Driver", UserRole::Driver, DEMO_PASSWORD).await?;

    let mut vehicles = Vec::new();
    for (plate, make, model_name, year, interval) in [
        ("VOL1234", "Volvo", "FH 540", 2021, 10_000),
        ("SCA5678", "Scania", "R450", 2020, 10_000),
        ("MER9012", "Mercedes-Benz", "Actros 2651", 2022, 15_000),
    ] {
        let v = vehicle::ActiveModel {
            id: Set(Uuid::new_v4()),
            plate: Set(plate.to_string()),
            make: Set(make.to_string()),
            model_name: Set(model_name.to_string()),
            year: Set(year),
            current_mileage: Set(0),
            maintenance_interval_km: Set(interval),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        vehicle_driver::ActiveModel {
            vehicle_id: Set(v.id),
            user_id: Set(driver.id),
        }
        .insert(&txn)
        .await?;

        vehicles.push(v);
    }

    let history = [
        (0, MaintenanceType::Preventive, date(2025, 8, 1)?, "50,000 km service. Oil and filters.", 50_000, (180_000, 50_000)),
        (1, MaintenanceType::Corrective, date(2025, 6, 10)?, "Fuel injection repair.", 42_000, (350_000, 120_000)),
        (2, MaintenanceType::Preventive, date(2025, 9, 15)?, "15,000 km service. Alignment and balancing.", 15_000, (60_000, 30_000)),
    ];

    for (index, kind, day, description, mileage, (parts, labor)) in history {
        maintenance_record::ActiveModel {
            vehicle_id: Set(vehicles[index].id),
            maintenance_type: Set(kind),
            date: Set(day),
            description: Set(description.to_string()),
            mileage_at_maintenance: Set(mileage),
            parts_cost: Set(Decimal::new(parts, 2)),
            labor_cost: Set(Decimal::new(labor, 2)),
            mechanic_id: Set(Some(mechanic.id)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    // Due soon, overdue (never had preventive service), fine
    for (v, reading) in vehicles.iter().zip([59_500, 68_000, 23_000]) {
        ingest(db, events, v.id, Some(driver.id), reading).await?;
    }

    tracing::info!("Demo fleet seeded");
    Ok(())
}
