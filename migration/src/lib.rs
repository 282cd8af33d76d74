pub use sea_orm_migration::prelude::*;

mod m20251020_000001_create_users;
mod m20251020_000002_create_vehicles;
mod m20251020_000003_create_vehicle_drivers;
mod m20251020_000004_create_maintenance_records;
mod m20251020_000005_create_mileage_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251020_000001_create_users::Migration),
            Box::new(m20251020_000002_create_vehicles::Migration),
            Box::new(m20251020_000003_create_vehicle_drivers::Migration),
            Box::new(m20251020_000004_create_maintenance_records::Migration),
            Box::new(m20251020_000005_create_mileage_records::Migration),
        ]
    }
}
