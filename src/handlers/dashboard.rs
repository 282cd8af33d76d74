use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::UserRole;
use crate::error::AppResult;
use crate::services::alerts::{load_snapshot, sort_by_urgency, AlertEntry};
use crate::services::visibility::VehicleScope;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertOrder {
    /// Same order as the vehicle list (by plate)
    #[default]
    Fleet,
    /// Most overdue first
    Urgency,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub order: AlertOrder,
}

#[derive(Debug, Serialize)]
pub struct AlertView {
    pub vehicle_id: Uuid,
    pub plate: String,
    pub make: String,
    pub model_name: String,
    pub current_mileage: i32,
    pub next_due_mileage: i64,
    pub remaining: i64,
    pub overdue: bool,
}

impl From<&AlertEntry<'_>> for AlertView {
    fn from(entry: &AlertEntry<'_>) -> Self {
        Self {
            vehicle_id: entry.vehicle.id,
            plate: entry.vehicle.plate.clone(),
            make: entry.vehicle.make.clone(),
            model_name: entry.vehicle.model_name.clone(),
            current_mileage: entry.vehicle.current_mileage,
            next_due_mileage: entry.next_due_mileage,
            remaining: entry.remaining,
            overdue: entry.is_overdue(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub email: String,
    pub role: Option<UserRole>,
    pub visible_vehicles: usize,
    pub alert_list: Vec<AlertView>,
}

/// Maintenance alerts for the vehicles the caller can see
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardResponse>> {
    let scope = VehicleScope::for_viewer(claims.sub, claims.role);
    let snapshot = load_snapshot(state.db.as_ref(), scope).await?;

    let mut alerts = snapshot.alerts();
    if query.order == AlertOrder::Urgency {
        sort_by_urgency(&mut alerts);
    }

    let overdue = alerts.iter().filter(|a| a.is_overdue()).count();
    state
        .events
        .alerts_computed(claims.sub, snapshot.vehicles.len(), alerts.len(), overdue);

    Ok(Json(DashboardResponse {
        email: claims.email,
        role: claims.role,
        visible_vehicles: snapshot.vehicles.len(),
        alert_list: alerts.iter().map(AlertView::from).collect(),
    }))
}
