pub mod maintenance_record;
pub mod mileage_record;
pub mod user;
pub mod vehicle;
pub mod vehicle_driver;
