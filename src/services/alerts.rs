//! Preventive maintenance alerts shown on the dashboard.
//!
//! A vehicle is due for service one full interval after its last preventive
//! maintenance (or after zero km when it has none). It is flagged once its
//! current mileage is within [`ALERT_THRESHOLD`] of that point, and stays
//! flagged while overdue.

use std::collections::HashMap;

use sea_orm::{
    AccessMode, ColumnTrait, ConnectionTrait, EntityTrait, IsolationLevel, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::maintenance_record::{self, MaintenanceType};
use crate::entities::vehicle;
use crate::error::AppResult;
use crate::services::visibility::{VehicleScope, visible_vehicles};

/// Distance before the due point at which a vehicle starts showing up.
pub const ALERT_THRESHOLD: i64 = 1000;

#[derive(Debug, Clone)]
pub struct AlertEntry<'a> {
    pub vehicle: &'a vehicle::Model,
    /// Distance left until service; zero or negative means overdue.
    pub remaining: i64,
    pub next_due_mileage: i64,
}

impl AlertEntry<'_> {
    pub fn is_overdue(&self) -> bool {
        self.remaining <= 0
    }
}

pub fn next_due_mileage(
    vehicle: &vehicle::Model,
    last_preventive: Option<&maintenance_record::Model>,
) -> i64 {
    let interval = i64::from(vehicle.maintenance_interval_km);

    match last_preventive {
        Some(record) => i64::from(record.mileage_at_maintenance) + interval,
        None => interval,
    }
}

/// Keeps the most recent preventive record per vehicle.
///
/// Records on the same date are ordered by id, so the one inserted last wins.
pub fn latest_preventive<I>(records: I) -> HashMap<Uuid, maintenance_record::Model>
where
    I: IntoIterator<Item = maintenance_record::Model>,
{
    let mut latest: HashMap<Uuid, maintenance_record::Model> = HashMap::new();

    for record in records.into_iter().filter(|r| r.is_preventive()) {
        let newer = latest
            .get(&record.vehicle_id)
            .is_none_or(|current| (record.date, record.id) > (current.date, current.id));

        if newer {
            latest.insert(record.vehicle_id, record);
        }
    }

    latest
}

/// Flags every vehicle that is due soon or overdue, in input order.
pub fn compute_alerts<'a, F>(vehicles: &'a [vehicle::Model], last_preventive: F) -> Vec<AlertEntry<'a>>
where
    F: Fn(&vehicle::Model) -> Option<&'a maintenance_record::Model>,
{
    vehicles
        .iter()
        .filter_map(|v| {
            let next_due = next_due_mileage(v, last_preventive(v));
            let current = i64::from(v.current_mileage);

            (current >= next_due - ALERT_THRESHOLD).then(|| AlertEntry {
                vehicle: v,
                remaining: next_due - current,
                next_due_mileage: next_due,
            })
        })
        .collect()
}

/// Most urgent first; vehicles with equal distance keep their relative order.
pub fn sort_by_urgency(entries: &mut [AlertEntry<'_>]) {
    entries.sort_by_key(|e| e.remaining);
}

/// The vehicles in `scope` and their latest preventive records, read at one point in time.
#[derive(Debug, Default)]
pub struct FleetSnapshot {
    pub vehicles: Vec<vehicle::Model>,
    pub last_preventive: HashMap<Uuid, maintenance_record::Model>,
}

impl FleetSnapshot {
    pub fn alerts(&self) -> Vec<AlertEntry<'_>> {
        compute_alerts(&self.vehicles, |v| self.last_preventive.get(&v.id))
    }
}

/// Both queries run in one read-only repeatable-read transaction, so a reading
/// or maintenance record committed in between cannot split the snapshot.
pub async fn load_snapshot<C>(db: &C, scope: VehicleScope) -> AppResult<FleetSnapshot>
where
    C: ConnectionTrait + TransactionTrait,
{
    if scope == VehicleScope::Nothing {
        return Ok(FleetSnapshot::default());
    }

    let txn = db
        .begin_with_config(Some(IsolationLevel::RepeatableRead), Some(AccessMode::ReadOnly))
        .await?;

    let vehicles = visible_vehicles(&txn, scope).await?;
    if vehicles.is_empty() {
        txn.commit().await?;
        return Ok(FleetSnapshot::default());
    }

    let ids: Vec<Uuid> = vehicles.iter().map(|v| v.id).collect();
    let records = maintenance_record::Entity::find()
        .filter(maintenance_record::Column::VehicleId.is_in(ids))
        .filter(maintenance_record::Column::MaintenanceType.eq(MaintenanceType::Preventive))
        .order_by_desc(maintenance_record::Column::Date)
        .order_by_desc(maintenance_record::Column::Id)
        .all(&txn)
        .await?;

    txn.commit().await?;

    Ok(FleetSnapshot {
        vehicles,
        last_preventive: latest_preventive(records),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use sea_orm::prelude::Decimal;

    fn vehicle(plate: &str, interval: i32, current: i32) -> vehicle::Model {
        vehicle::Model {
            id: Uuid::new_v4(),
            plate: plate.to_string(),
            make: "Volvo".to_string(),
            model_name: "FH 540".to_string(),
            year: 2021,
            current_mileage: current,
            maintenance_interval_km: interval,
            created_at: Utc::now().into(),
        }
    }

    fn record(
        id: i32,
        vehicle_id: Uuid,
        kind: MaintenanceType,
        date: (i32, u32, u32),
        mileage: i32,
    ) -> maintenance_record::Model {
        maintenance_record::Model {
            id,
            vehicle_id,
            maintenance_type: kind,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            description: String::new(),
            mileage_at_maintenance: mileage,
            parts_cost: Decimal::ZERO,
            labor_cost: Decimal::ZERO,
            mechanic_id: None,
        }
    }

    fn alerts_for(vehicles: &[vehicle::Model], records: Vec<maintenance_record::Model>) -> Vec<(String, i64, i64)> {
        let latest = latest_preventive(records);
        compute_alerts(vehicles, |v| latest.get(&v.id))
            .into_iter()
            .map(|e| (e.vehicle.plate.clone(), e.remaining, e.next_due_mileage))
            .collect()
    }

    #[test]
    fn test_due_soon_is_flagged() {
        let v = vehicle("ALERT01", 10_000, 59_500);
        let r = record(1, v.id, MaintenanceType::Preventive, (2024, 1, 1), 50_000);

        assert_eq!(
            alerts_for(&[v], vec![r]),
            vec![("ALERT01".to_string(), 500, 60_000)]
        );
    }

    #[test]
    fn test_far_from_service_is_not_flagged() {
        let v = vehicle("SAFE001", 10_000, 22_000);
        let r = record(1, v.id, MaintenanceType::Preventive, (2024, 5, 1), 20_000);

        assert!(alerts_for(&[v], vec![r]).is_empty());
    }

    #[test]
    fn test_no_history_uses_one_interval_from_zero() {
        let v = vehicle("MER9012", 15_000, 14_200);

        assert_eq!(
            alerts_for(&[v], vec![]),
            vec![("MER9012".to_string(), 800, 15_000)]
        );
    }

    #[test]
    fn test_threshold_boundary() {
        // Due at 30_000
        let cases = [(29_000, true), (28_999, false), (30_000, true), (30_001, true)];

        for (current, flagged) in cases {
            let v = vehicle("B0UND", 10_000, current);
            let r = record(1, v.id, MaintenanceType::Preventive, (2024, 1, 1), 20_000);
            assert_eq!(!alerts_for(&[v], vec![r]).is_empty(), flagged, "current = {current}");
        }
    }

    #[test]
    fn test_overdue_has_negative_remaining() {
        let vehicles = [vehicle("LATE01", 10_000, 31_500)];
        let r = record(1, vehicles[0].id, MaintenanceType::Preventive, (2024, 1, 1), 20_000);
        let latest = latest_preventive(vec![r]);
        let alerts = compute_alerts(&vehicles, |v| latest.get(&v.id));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].remaining, -1_500);
        assert!(alerts[0].is_overdue());
    }

    #[test]
    fn test_new_vehicle_at_zero() {
        let short = vehicle("SHORT", 1_000, 0);
        let normal = vehicle("NORMAL", 10_000, 0);

        assert_eq!(
            alerts_for(&[short, normal], vec![]),
            vec![("SHORT".to_string(), 1_000, 1_000)]
        );
    }

    #[test]
    fn test_zero_interval_is_always_flagged() {
        let v = vehicle("ZERO", 0, 0);
        let alerts = alerts_for(&[v], vec![]);
        assert_eq!(alerts, vec![("ZERO".to_string(), 0, 0)]);
    }

    #[test]
    fn test_corrective_records_are_ignored() {
        let v = vehicle("COR001", 10_000, 9_500);
        let corrective = record(1, v.id, MaintenanceType::Corrective, (2024, 6, 1), 9_000);

        // Still due at 10_000 because only preventive service resets the cycle
        assert_eq!(
            alerts_for(&[v], vec![corrective]),
            vec![("COR001".to_string(), 500, 10_000)]
        );
    }

    #[test]
    fn test_most_recent_preventive_wins() {
        let v = vehicle("HIST01", 10_000, 21_000);
        let records = vec![
            record(1, v.id, MaintenanceType::Preventive, (2023, 1, 1), 10_000),
            record(2, v.id, MaintenanceType::Preventive, (2024, 1, 1), 20_000),
            record(3, v.id, MaintenanceType::Preventive, (2022, 1, 1), 0),
        ];

        let latest = latest_preventive(records.clone());
        assert_eq!(latest[&v.id].id, 2);
        // Due at 30_000, not at 20_000
        assert!(alerts_for(&[v], records).is_empty());
    }

    #[test]
    fn test_same_date_tie_breaks_on_highest_id() {
        let vehicle_id = Uuid::new_v4();
        let records = vec![
            record(7, vehicle_id, MaintenanceType::Preventive, (2024, 3, 1), 30_000),
            record(9, vehicle_id, MaintenanceType::Preventive, (2024, 3, 1), 31_000),
            record(8, vehicle_id, MaintenanceType::Preventive, (2024, 3, 1), 29_000),
        ];

        assert_eq!(latest_preventive(records)[&vehicle_id].id, 9);
    }

    #[test]
    fn test_input_order_is_preserved() {
        let vehicles = vec![
            vehicle("AAA", 10_000, 9_900),
            vehicle("BBB", 10_000, 12_000),
            vehicle("CCC", 10_000, 1_000),
            vehicle("DDD", 10_000, 9_000),
        ];

        let plates: Vec<String> = alerts_for(&vehicles, vec![]).into_iter().map(|a| a.0).collect();
        assert_eq!(plates, vec!["AAA", "BBB", "DDD"]);
    }

    #[test]
    fn test_sort_by_urgency() {
        let vehicles = vec![
            vehicle("AAA", 10_000, 9_900),
            vehicle("BBB", 10_000, 12_000),
            vehicle("DDD", 10_000, 9_000),
        ];

        let mut alerts = compute_alerts(&vehicles, |_| None);
        sort_by_urgency(&mut alerts);

        let plates: Vec<&str> = alerts.iter().map(|a| a.vehicle.plate.as_str()).collect();
        assert_eq!(plates, vec!["BBB", "AAA", "DDD"]);
    }

    #[test]
    fn test_snapshot_alerts_use_its_own_history() {
        let v = vehicle("SNAP01", 10_000, 59_500);
        let r = record(1, v.id, MaintenanceType::Preventive, (2024, 1, 1), 50_000);
        let snapshot = FleetSnapshot {
            last_preventive: latest_preventive(vec![r]),
            vehicles: vec![v],
        };

        let alerts = snapshot.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].next_due_mileage, 60_000);
    }
}
