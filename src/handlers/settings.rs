use crate::config::{self, SETTINGS_CACHE_KEY};
use crate::schemas::{ApiEnvelope, AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use model::entities::setting;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Site-wide settings response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingsResponse {
    pub site_name: String,
    pub admin_cc_email: Option<String>,
    pub admin_cc_always: bool,
    pub webhook_endpoint: Option<String>,
    pub webhook_channel: Option<String>,
    pub default_eula_text: Option<String>,
}

impl From<setting::Model> for SettingsResponse {
    fn from(model: setting::Model) -> Self {
        Self {
            site_name: model.site_name,
            admin_cc_email: model.admin_cc_email,
            admin_cc_always: model.admin_cc_always,
            webhook_endpoint: model.webhook_endpoint,
            webhook_channel: model.webhook_channel,
            default_eula_text: model.default_eula_text,
        }
    }
}

/// Request body for updating the settings row
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateSettingsRequest {
    pub site_name: Option<String>,
    #[validate(email(message = "The admin_cc_email field must be a valid email address."))]
    pub admin_cc_email: Option<String>,
    pub admin_cc_always: Option<bool>,
    #[validate(url(message = "The webhook_endpoint field must be a valid URL."))]
    pub webhook_endpoint: Option<String>,
    pub webhook_channel: Option<String>,
    pub default_eula_text: Option<String>,
}

/// Get the settings row (created with defaults on first access)
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    tag = "settings",
    responses(
        (status = 200, description = "Settings retrieved successfully", body = ApiEnvelope<SettingsResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<SettingsResponse>>, StatusCode> {
    trace!("Entering get_settings function");

    match config::cached_settings(&state.db, &state.cache).await {
        Ok(settings) => Ok(Json(ApiEnvelope::success(
            SettingsResponse::from(settings),
            "Settings retrieved successfully",
        ))),
        Err(db_error) => {
            error!("Failed to retrieve settings: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update the settings row and invalidate its cache entry
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    tag = "settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings updated successfully", body = ApiEnvelope<SettingsResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<ApiEnvelope<SettingsResponse>>, StatusCode> {
    trace!("Entering update_settings function");

    if let Err(errors) = request.validate() {
        warn!("Settings validation failed: {}", errors);
        return Ok(Json(ApiEnvelope::from_validation(&errors)));
    }

    let existing = match config::cached_settings(&state.db, &state.cache).await {
        Ok(settings) => settings,
        Err(db_error) => {
            error!("Failed to load settings for update: {}", db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut settings_active: setting::ActiveModel = existing.into();

    if let Some(site_name) = request.site_name {
        settings_active.site_name = Set(site_name);
    }
    if let Some(admin_cc_email) = request.admin_cc_email {
        settings_active.admin_cc_email = Set(Some(admin_cc_email));
    }
    if let Some(admin_cc_always) = request.admin_cc_always {
        settings_active.admin_cc_always = Set(admin_cc_always);
    }
    if let Some(webhook_endpoint) = request.webhook_endpoint {
        settings_active.webhook_endpoint = Set(Some(webhook_endpoint));
    }
    if let Some(webhook_channel) = request.webhook_channel {
        settings_active.webhook_channel = Set(Some(webhook_channel));
    }
    if let Some(default_eula_text) = request.default_eula_text {
        settings_active.default_eula_text = Set(Some(default_eula_text));
    }

    match settings_active.update(&state.db).await {
        Ok(updated) => {
            info!("Settings updated");
            state.cache.invalidate(SETTINGS_CACHE_KEY).await;
            Ok(Json(ApiEnvelope::success(
                SettingsResponse::from(updated),
                "Settings updated successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to update settings: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
