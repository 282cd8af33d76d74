use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::error::{AppError, AppResult};
use crate::services::visibility::{has_capability, Capability};
use crate::utils::jwt::{verify_token, Claims};
use crate::AppState;

/// Extract and validate JWT token from Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let claims = verify_token(auth.token(), &state.config.jwt_secret)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn check_capability(request: &Request, capability: Capability, denied: &str) -> AppResult<()> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))?;

    if !has_capability(claims.role, capability) {
        tracing::debug!(user_id = %claims.sub, ?capability, "Capability check failed");
        return Err(AppError::Forbidden(denied.to_string()));
    }

    Ok(())
}

/// Require the right to manage accounts and roles (admins)
pub async fn require_admin(request: Request, next: Next) -> AppResult<Response> {
    check_capability(&request, Capability::ManageUsers, "Admin access required")?;
    Ok(next.run(request).await)
}

/// Require the right to register, edit and delete vehicles
pub async fn require_vehicle_manager(request: Request, next: Next) -> AppResult<Response> {
    check_capability(&request, Capability::ManageVehicles, "Admin access required")?;
    Ok(next.run(request).await)
}

/// Require access to the maintenance history (mechanics and admins)
pub async fn require_maintenance_access(request: Request, next: Next) -> AppResult<Response> {
    check_capability(
        &request,
        Capability::ViewMaintenanceRecord,
        "Mechanic access required",
    )?;
    Ok(next.run(request).await)
}

pub async fn require_maintenance_writer(request: Request, next: Next) -> AppResult<Response> {
    check_capability(
        &request,
        Capability::AddMaintenanceRecord,
        "Not allowed to record maintenance",
    )?;
    Ok(next.run(request).await)
}

pub async fn require_maintenance_editor(request: Request, next: Next) -> AppResult<Response> {
    check_capability(
        &request,
        Capability::ChangeMaintenanceRecord,
        "Not allowed to change maintenance records",
    )?;
    Ok(next.run(request).await)
}

/// Require the right to report odometer readings (drivers and admins)
pub async fn require_mileage_reporter(request: Request, next: Next) -> AppResult<Response> {
    check_capability(
        &request,
        Capability::AddMileageRecord,
        "Driver access required",
    )?;
    Ok(next.run(request).await)
}

pub async fn require_mileage_viewer(request: Request, next: Next) -> AppResult<Response> {
    check_capability(
        &request,
        Capability::ViewMileageRecord,
        "Not allowed to view mileage records",
    )?;
    Ok(next.run(request).await)
}
