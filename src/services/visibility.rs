//! Role capabilities and the vehicle visibility filter.
//!
//! Every permission question in the service goes through [`has_capability`];
//! which vehicles a viewer may see is answered once by [`VehicleScope`].

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    sea_query::JoinType,
};
use uuid::Uuid;

use crate::entities::user::UserRole;
use crate::entities::{vehicle, vehicle_driver};
use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewVehicle,
    ManageVehicles,
    AddMileageRecord,
    ViewMileageRecord,
    AddMaintenanceRecord,
    ChangeMaintenanceRecord,
    ViewMaintenanceRecord,
    ManageUsers,
}

pub fn has_capability(role: Option<UserRole>, capability: Capability) -> bool {
    use Capability::*;

    match role {
        Some(UserRole::Admin) => true,
        Some(UserRole::Mechanic) => matches!(
            capability,
            ViewVehicle | AddMaintenanceRecord | ChangeMaintenanceRecord | ViewMaintenanceRecord
        ),
        // Drivers see vehicles through their assignments, not through ViewVehicle
        Some(UserRole::Driver) => matches!(capability, AddMileageRecord | ViewMileageRecord),
        None => false,
    }
}

pub fn user_in_role(role: Option<UserRole>, expected: UserRole) -> bool {
    role == Some(expected)
}

/// Which vehicles a viewer is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleScope {
    All,
    AssignedTo(Uuid),
    Nothing,
}

impl VehicleScope {
    pub fn for_viewer(user_id: Uuid, role: Option<UserRole>) -> Self {
        if has_capability(role, Capability::ViewVehicle) {
            VehicleScope::All
        } else if user_in_role(role, UserRole::Driver) {
            VehicleScope::AssignedTo(user_id)
        } else {
            VehicleScope::Nothing
        }
    }

    /// Whether a vehicle with the given assigned drivers falls inside this scope.
    pub fn includes(&self, assigned_drivers: &[Uuid]) -> bool {
        match self {
            VehicleScope::All => true,
            VehicleScope::AssignedTo(user_id) => assigned_drivers.contains(user_id),
            VehicleScope::Nothing => false,
        }
    }
}

/// Vehicles visible under `scope`, ordered by plate.
pub async fn visible_vehicles<C: ConnectionTrait>(
    db: &C,
    scope: VehicleScope,
) -> AppResult<Vec<vehicle::Model>> {
    let query = vehicle::Entity::find().order_by_asc(vehicle::Column::Plate);

    let vehicles = match scope {
        VehicleScope::All => query.all(db).await?,
        VehicleScope::AssignedTo(user_id) => {
            query
                .join(JoinType::InnerJoin, vehicle::Relation::Assignments.def())
                .filter(vehicle_driver::Column::UserId.eq(user_id))
                .all(db)
                .await?
        }
        VehicleScope::Nothing => Vec::new(),
    };

    Ok(vehicles)
}

/// Checks a single vehicle against `scope`, loading its assignments only when needed.
pub async fn can_see_vehicle<C: ConnectionTrait>(
    db: &C,
    scope: VehicleScope,
    vehicle_id: Uuid,
) -> AppResult<bool> {
    match scope {
        VehicleScope::All => Ok(true),
        VehicleScope::Nothing => Ok(false),
        VehicleScope::AssignedTo(_) => {
            let drivers: Vec<Uuid> = vehicle_driver::Entity::find()
                .filter(vehicle_driver::Column::VehicleId.eq(vehicle_id))
                .all(db)
                .await?
                .into_iter()
                .map(|a| a.user_id)
                .collect();

            Ok(scope.includes(&drivers))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_every_capability() {
        for cap in [
            Capability::ViewVehicle,
            Capability::ManageVehicles,
            Capability::AddMileageRecord,
            Capability::ChangeMaintenanceRecord,
            Capability::ManageUsers,
        ] {
            assert!(has_capability(Some(UserRole::Admin), cap));
        }
    }

    #[test]
    fn test_mechanic_capabilities() {
        let role = Some(UserRole::Mechanic);
        assert!(has_capability(role, Capability::ViewVehicle));
        assert!(has_capability(role, Capability::ChangeMaintenanceRecord));
        assert!(!has_capability(role, Capability::AddMileageRecord));
        assert!(!has_capability(role, Capability::ManageVehicles));
    }

    #[test]
    fn test_driver_cannot_view_whole_fleet() {
        let role = Some(UserRole::Driver);
        assert!(has_capability(role, Capability::AddMileageRecord));
        assert!(!has_capability(role, Capability::ViewVehicle));
        assert!(!has_capability(role, Capability::AddMaintenanceRecord));
    }

    #[test]
    fn test_scope_per_role() {
        let id = Uuid::new_v4();
        assert_eq!(VehicleScope::for_viewer(id, Some(UserRole::Admin)), VehicleScope::All);
        assert_eq!(VehicleScope::for_viewer(id, Some(UserRole::Mechanic)), VehicleScope::All);
        assert_eq!(
            VehicleScope::for_viewer(id, Some(UserRole::Driver)),
            VehicleScope::AssignedTo(id)
        );
        assert_eq!(VehicleScope::for_viewer(id, None), VehicleScope::Nothing);
    }

    #[test]
    fn test_driver_sees_only_assigned_vehicles() {
        let driver = Uuid::new_v4();
        let other = Uuid::new_v4();
        let scope = VehicleScope::for_viewer(driver, Some(UserRole::Driver));

        assert!(scope.includes(&[other, driver]));
        assert!(!scope.includes(&[other]));
        assert!(!scope.includes(&[]));
    }

    #[test]
    fn test_unrecognized_role_sees_nothing() {
        let scope = VehicleScope::for_viewer(Uuid::new_v4(), None);
        assert!(!scope.includes(&[]));
        assert!(!scope.includes(&[Uuid::new_v4()]));
    }
}
