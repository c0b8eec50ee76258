use crate::handlers::{
    assets::{
        bulk_checkout, checkin_asset, create_asset, delete_asset, get_asset, get_assets,
        update_asset,
    },
    categories::{create_category, delete_category, get_categories, get_category, update_category},
    health::health_check,
    licenses::{
        create_license, delete_license, get_license, get_license_utilization, get_licenses,
        update_license,
    },
    locations::{create_location, delete_location, get_location, get_locations, update_location},
    maintenances::{
        create_maintenance, delete_maintenance, get_maintenance, get_maintenances,
        update_maintenance,
    },
    manufacturers::{
        create_manufacturer, delete_manufacturer, get_manufacturer, get_manufacturers,
        update_manufacturer,
    },
    reports::get_activity_report,
    seats::{get_seat, get_seats, update_seat},
    settings::{get_settings, update_settings},
    users::{create_user, delete_user, get_user, get_user_licenses, get_users, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User CRUD routes
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:user_id", get(get_user))
        .route("/api/v1/users/:user_id", put(update_user))
        .route("/api/v1/users/:user_id", delete(delete_user))
        .route("/api/v1/users/:user_id/licenses", get(get_user_licenses))
        // Location CRUD routes
        .route("/api/v1/locations", post(create_location))
        .route("/api/v1/locations", get(get_locations))
        .route("/api/v1/locations/:location_id", get(get_location))
        .route("/api/v1/locations/:location_id", put(update_location))
        .route("/api/v1/locations/:location_id", delete(delete_location))
        // Category CRUD routes
        .route("/api/v1/categories", post(create_category))
        .route("/api/v1/categories", get(get_categories))
        .route("/api/v1/categories/:category_id", get(get_category))
        .route("/api/v1/categories/:category_id", put(update_category))
        .route("/api/v1/categories/:category_id", delete(delete_category))
        // Manufacturer CRUD routes
        .route("/api/v1/manufacturers", post(create_manufacturer))
        .route("/api/v1/manufacturers", get(get_manufacturers))
        .route("/api/v1/manufacturers/:manufacturer_id", get(get_manufacturer))
        .route("/api/v1/manufacturers/:manufacturer_id", put(update_manufacturer))
        .route("/api/v1/manufacturers/:manufacturer_id", delete(delete_manufacturer))
        // Asset CRUD and checkout routes. The checkout route is registered
        // before the :asset_id routes so the literal segment wins.
        .route("/api/v1/assets/checkout", post(bulk_checkout))
        .route("/api/v1/assets", post(create_asset))
        .route("/api/v1/assets", get(get_assets))
        .route("/api/v1/assets/:asset_id", get(get_asset))
        .route("/api/v1/assets/:asset_id", put(update_asset))
        .route("/api/v1/assets/:asset_id", delete(delete_asset))
        .route("/api/v1/assets/:asset_id/checkin", post(checkin_asset))
        // License CRUD and seat routes
        .route("/api/v1/licenses", post(create_license))
        .route("/api/v1/licenses", get(get_licenses))
        .route("/api/v1/licenses/:license_id", get(get_license))
        .route("/api/v1/licenses/:license_id", put(update_license))
        .route("/api/v1/licenses/:license_id", delete(delete_license))
        .route(
            "/api/v1/licenses/:license_id/utilization",
            get(get_license_utilization),
        )
        .route("/api/v1/licenses/:license_id/seats", get(get_seats))
        .route(
            "/api/v1/licenses/:license_id/seats/:seat_id",
            get(get_seat),
        )
        .route(
            "/api/v1/licenses/:license_id/seats/:seat_id",
            patch(update_seat),
        )
        // Maintenance CRUD routes
        .route("/api/v1/maintenances", post(create_maintenance))
        .route("/api/v1/maintenances", get(get_maintenances))
        .route("/api/v1/maintenances/:maintenance_id", get(get_maintenance))
        .route("/api/v1/maintenances/:maintenance_id", put(update_maintenance))
        .route("/api/v1/maintenances/:maintenance_id", delete(delete_maintenance))
        // Reports
        .route("/api/v1/reports/activity", get(get_activity_report))
        // Settings
        .route("/api/v1/settings", get(get_settings))
        .route("/api/v1/settings", put(update_settings))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
