use uuid::Uuid;

use crate::entities::mileage_record;

/// Receives the notable outcomes of the fleet services.
///
/// Handlers pass the sink stored in `AppState`; tests plug in their own.
pub trait FleetEvents: Send + Sync {
    fn mileage_ingested(&self, record: &mileage_record::Model, previous: i32, current: i32);

    fn alerts_computed(&self, viewer: Uuid, vehicles: usize, alerts: usize, overdue: usize);
}

/// Default sink: structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEvents;

impl FleetEvents for TracingEvents {
    fn mileage_ingested(&self, record: &mileage_record::Model, previous: i32, current: i32) {
        if current > previous {
            tracing::info!(
                vehicle_id = %record.vehicle_id,
                record_id = record.id,
                previous,
                current,
                "Vehicle mileage advanced"
            );
        } else {
            tracing::info!(
                vehicle_id = %record.vehicle_id,
                record_id = record.id,
                reported = record.mileage,
                current,
                "Mileage reading recorded below current mileage"
            );
        }
    }

    fn alerts_computed(&self, viewer: Uuid, vehicles: usize, alerts: usize, overdue: usize) {
        tracing::debug!(%viewer, vehicles, alerts, overdue, "Maintenance alerts computed");
    }
}
