use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{admin, auth, dashboard, driver, mechanic};
use crate::middleware::auth::{
    auth_middleware, require_admin, require_maintenance_access, require_maintenance_editor,
    require_maintenance_writer, require_mileage_reporter, require_mileage_viewer,
    require_vehicle_manager,
};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::role_rate_limit::{create_role_governor, RateLimitedRole};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let mechanic_governor = create_role_governor(RateLimitedRole::Mechanic);
    let driver_governor = create_role_governor(RateLimitedRole::Driver);
    let public_governor = create_public_governor();

    // Public routes (rate limited per IP)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor);

    // Any authenticated account; what it sees depends on its role
    let dashboard_routes = Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Fleet management (requires auth + ManageVehicles)
    let fleet_admin_routes = Router::new()
        .route("/vehicles", get(admin::list_vehicles))
        .route("/vehicles", post(admin::create_vehicle))
        .route("/vehicles/{id}", put(admin::update_vehicle))
        .route("/vehicles/{id}", delete(admin::delete_vehicle))
        .route("/vehicles/{id}/drivers/{user_id}", post(admin::assign_driver))
        .route("/vehicles/{id}/drivers/{user_id}", delete(admin::unassign_driver))
        .route_layer(middleware::from_fn(require_vehicle_manager));

    // Account management (requires auth + ManageUsers)
    let user_admin_routes = Router::new()
        .route("/users", get(admin::list_all_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/{id}/role", put(admin::update_user_role))
        .route_layer(middleware::from_fn(require_admin));

    let admin_routes = fleet_admin_routes
        .merge(user_admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Maintenance routes (requires auth + mechanic or admin role); writes need their own capability
    let maintenance_routes = Router::new()
        .route("/vehicles", get(mechanic::list_vehicles))
        .route("/vehicles/{id}/maintenance", get(mechanic::vehicle_history))
        .route("/maintenance", get(mechanic::list_records))
        .route(
            "/maintenance",
            post(mechanic::create_record)
                .route_layer(middleware::from_fn(require_maintenance_writer)),
        )
        .route(
            "/maintenance/{id}",
            put(mechanic::update_record)
                .route_layer(middleware::from_fn(require_maintenance_editor)),
        )
        .layer(mechanic_governor)
        .layer(middleware::from_fn(require_maintenance_access))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Driver routes (requires auth; reading and reporting are checked per route)
    let driver_routes = Router::new()
        .route(
            "/vehicles",
            get(driver::my_vehicles).route_layer(middleware::from_fn(require_mileage_reporter)),
        )
        .route(
            "/mileage",
            get(driver::my_mileage_records)
                .route_layer(middleware::from_fn(require_mileage_viewer)),
        )
        .route(
            "/mileage",
            post(driver::submit_mileage)
                .route_layer(middleware::from_fn(require_mileage_reporter)),
        )
        .layer(driver_governor)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", dashboard_routes.merge(maintenance_routes))
        .nest("/api/admin", admin_routes)
        .nest("/api/driver", driver_routes)
        .with_state(state)
}
