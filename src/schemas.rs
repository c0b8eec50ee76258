use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use utoipa::{OpenApi, ToSchema};

use crate::notifications::events::AppEvent;
use model::entities::setting;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for the settings row and per-license seat counts
    pub cache: Cache<String, CachedData>,
    /// In-process event channel feeding the notification listener
    pub events: mpsc::UnboundedSender<AppEvent>,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Settings(setting::Model),
    Utilization(SeatUtilization),
}

/// Seat counts for one license
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SeatUtilization {
    pub license_id: i32,
    pub total: u64,
    pub assigned: u64,
    pub available: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// Standard response envelope.
///
/// Business-rule violations and field validation failures come back as HTTP
/// 200 with `status: "error"` and either a message string or a map of field
/// names to message lists in `messages`. Plain lookups that miss return 404,
/// database failures 500.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiEnvelope<T> {
    pub status: ApiStatus,
    pub messages: serde_json::Value,
    pub payload: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn success(payload: T, message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Success,
            messages: serde_json::Value::String(message.into()),
            payload: Some(payload),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Error,
            messages: serde_json::Value::String(message.into()),
            payload: None,
        }
    }

    /// Error envelope from validator derive failures.
    pub fn from_validation(errors: &validator::ValidationErrors) -> Self {
        let map = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                (
                    field.to_string(),
                    field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("The {field} field is invalid."))
                        })
                        .collect(),
                )
            })
            .collect();
        Self::field_errors(map)
    }

    /// Error envelope with per-field validation messages.
    pub fn field_errors(errors: BTreeMap<String, Vec<String>>) -> Self {
        let map = errors
            .into_iter()
            .map(|(field, messages)| {
                (
                    field,
                    serde_json::Value::Array(
                        messages.into_iter().map(serde_json::Value::String).collect(),
                    ),
                )
            })
            .collect();
        Self {
            status: ApiStatus::Error,
            messages: serde_json::Value::Object(map),
            payload: None,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::get_user_licenses,
        crate::handlers::locations::create_location,
        crate::handlers::locations::get_locations,
        crate::handlers::locations::get_location,
        crate::handlers::locations::update_location,
        crate::handlers::locations::delete_location,
        crate::handlers::categories::create_category,
        crate::handlers::categories::get_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::manufacturers::create_manufacturer,
        crate::handlers::manufacturers::get_manufacturers,
        crate::handlers::manufacturers::get_manufacturer,
        crate::handlers::manufacturers::update_manufacturer,
        crate::handlers::manufacturers::delete_manufacturer,
        crate::handlers::assets::create_asset,
        crate::handlers::assets::get_assets,
        crate::handlers::assets::get_asset,
        crate::handlers::assets::update_asset,
        crate::handlers::assets::delete_asset,
        crate::handlers::assets::bulk_checkout,
        crate::handlers::assets::checkin_asset,
        crate::handlers::licenses::create_license,
        crate::handlers::licenses::get_licenses,
        crate::handlers::licenses::get_license,
        crate::handlers::licenses::update_license,
        crate::handlers::licenses::delete_license,
        crate::handlers::licenses::get_license_utilization,
        crate::handlers::seats::get_seats,
        crate::handlers::seats::get_seat,
        crate::handlers::seats::update_seat,
        crate::handlers::maintenances::create_maintenance,
        crate::handlers::maintenances::get_maintenances,
        crate::handlers::maintenances::get_maintenance,
        crate::handlers::maintenances::update_maintenance,
        crate::handlers::maintenances::delete_maintenance,
        crate::handlers::reports::get_activity_report,
        crate::handlers::settings::get_settings,
        crate::handlers::settings::update_settings,
    ),
    components(
        schemas(
            ApiEnvelope<serde_json::Value>,
            ApiStatus,
            HealthResponse,
            SeatUtilization,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::users::AssignedLicenseResponse,
            crate::handlers::locations::CreateLocationRequest,
            crate::handlers::locations::UpdateLocationRequest,
            crate::handlers::locations::LocationResponse,
            crate::handlers::categories::CreateCategoryRequest,
            crate::handlers::categories::UpdateCategoryRequest,
            crate::handlers::categories::CategoryResponse,
            crate::handlers::manufacturers::CreateManufacturerRequest,
            crate::handlers::manufacturers::UpdateManufacturerRequest,
            crate::handlers::manufacturers::ManufacturerResponse,
            crate::handlers::assets::CreateAssetRequest,
            crate::handlers::assets::UpdateAssetRequest,
            crate::handlers::assets::AssetResponse,
            crate::handlers::assets::BulkCheckoutRequest,
            crate::handlers::licenses::CreateLicenseRequest,
            crate::handlers::licenses::UpdateLicenseRequest,
            crate::handlers::licenses::LicenseResponse,
            crate::handlers::seats::SeatResponse,
            crate::handlers::seats::SeatListResponse,
            crate::handlers::maintenances::CreateMaintenanceRequest,
            crate::handlers::maintenances::UpdateMaintenanceRequest,
            crate::handlers::maintenances::MaintenanceResponse,
            crate::handlers::reports::ActivityEntry,
            crate::handlers::settings::SettingsResponse,
            crate::handlers::settings::UpdateSettingsRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User management"),
        (name = "locations", description = "Location management"),
        (name = "categories", description = "Category management"),
        (name = "manufacturers", description = "Manufacturer management"),
        (name = "assets", description = "Hardware asset management and checkout"),
        (name = "licenses", description = "License management"),
        (name = "seats", description = "License seat checkout and checkin"),
        (name = "maintenances", description = "Asset maintenance records"),
        (name = "reports", description = "Audit log reports"),
        (name = "settings", description = "Site-wide settings"),
    ),
    info(
        title = "assetrust API",
        description = "IT asset management API - hardware, licenses, and their checkout lifecycle",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
