use crate::audit::{self, AuditEntry, ITEM_ASSET};
use crate::schemas::{ApiEnvelope, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use model::entities::{asset, maintenance, maintenance::MaintenanceType};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a maintenance record
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateMaintenanceRequest {
    pub asset_id: i32,
    /// One of `maintenance`, `repair`, `upgrade`
    pub maintenance_type: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
    pub is_warranty: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Option<i32>,
}

/// Request body for updating a maintenance record
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateMaintenanceRequest {
    pub maintenance_type: Option<String>,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub is_warranty: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
}

/// Maintenance response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceResponse {
    pub id: i32,
    pub asset_id: i32,
    pub maintenance_type: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
    pub is_warranty: bool,
    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Option<i32>,
}

impl From<maintenance::Model> for MaintenanceResponse {
    fn from(model: maintenance::Model) -> Self {
        Self {
            id: model.id,
            asset_id: model.asset_id,
            maintenance_type: maintenance_type_label(model.maintenance_type).to_string(),
            name: model.name,
            start_date: model.start_date,
            completion_date: model.completion_date,
            is_warranty: model.is_warranty,
            cost: model.cost,
            notes: model.notes,
            created_by: model.created_by,
        }
    }
}

fn maintenance_type_label(maintenance_type: MaintenanceType) -> &'static str {
    match maintenance_type {
        MaintenanceType::Maintenance => "maintenance",
        MaintenanceType::Repair => "repair",
        MaintenanceType::Upgrade => "upgrade",
    }
}

fn parse_maintenance_type(value: &str) -> Option<MaintenanceType> {
    match value {
        "maintenance" => Some(MaintenanceType::Maintenance),
        "repair" => Some(MaintenanceType::Repair),
        "upgrade" => Some(MaintenanceType::Upgrade),
        _ => None,
    }
}

fn maintenance_type_error<T>() -> ApiEnvelope<T> {
    let mut errors = BTreeMap::new();
    errors.insert(
        "maintenance_type".to_string(),
        vec!["The maintenance_type field must be one of: maintenance, repair, upgrade.".to_string()],
    );
    ApiEnvelope::field_errors(errors)
}

/// Create a maintenance record for an asset
#[utoipa::path(
    post,
    path = "/api/v1/maintenances",
    tag = "maintenances",
    request_body = CreateMaintenanceRequest,
    responses(
        (status = 201, description = "Maintenance created successfully", body = ApiEnvelope<MaintenanceResponse>),
        (status = 200, description = "Validation failed", body = ApiEnvelope<serde_json::Value>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn create_maintenance(
    State(state): State<AppState>,
    Json(request): Json<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<MaintenanceResponse>>), StatusCode> {
    trace!("Entering create_maintenance function");
    debug!(
        "Creating maintenance '{}' for asset {}",
        request.name, request.asset_id
    );

    let Some(maintenance_type) = parse_maintenance_type(&request.maintenance_type) else {
        warn!("Unknown maintenance type: {}", request.maintenance_type);
        return Ok((StatusCode::OK, Json(maintenance_type_error())));
    };

    // The asset must exist and not be soft-deleted.
    match asset::Entity::find_by_id(request.asset_id).one(&state.db).await {
        Ok(Some(asset)) if !asset.is_deleted() => {}
        Ok(_) => {
            warn!(
                "Asset with ID {} not found for maintenance",
                request.asset_id
            );
            return Ok((
                StatusCode::OK,
                Json(ApiEnvelope::error("Asset not found")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup asset with ID {}: {}",
                request.asset_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let new_maintenance = maintenance::ActiveModel {
        asset_id: Set(request.asset_id),
        maintenance_type: Set(maintenance_type),
        name: Set(request.name.clone()),
        start_date: Set(request.start_date),
        completion_date: Set(request.completion_date),
        is_warranty: Set(request.is_warranty.unwrap_or(false)),
        cost: Set(request.cost),
        notes: Set(request.notes.clone()),
        created_by: Set(request.created_by),
        ..Default::default()
    };

    match new_maintenance.insert(&state.db).await {
        Ok(maintenance_model) => {
            info!(
                "Maintenance created successfully with ID: {}",
                maintenance_model.id
            );
            let log = AuditEntry::new(
                model::entities::action_log::ActionType::Update,
                ITEM_ASSET,
                request.asset_id,
            )
            .note(Some(format!(
                "Maintenance recorded: {}",
                maintenance_model.name
            )))
            .created_by(request.created_by);
            if let Err(db_error) = audit::record(&state.db, log).await {
                warn!("Failed to write maintenance audit entry: {}", db_error);
            }
            Ok((
                StatusCode::CREATED,
                Json(ApiEnvelope::success(
                    MaintenanceResponse::from(maintenance_model),
                    "Maintenance created successfully",
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to create maintenance: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all maintenance records
#[utoipa::path(
    get,
    path = "/api/v1/maintenances",
    tag = "maintenances",
    responses(
        (status = 200, description = "Maintenances retrieved successfully", body = ApiEnvelope<Vec<MaintenanceResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_maintenances(
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<MaintenanceResponse>>>, StatusCode> {
    trace!("Entering get_maintenances function");

    match maintenance::Entity::find().all(&state.db).await {
        Ok(maintenances) => {
            debug!(
                "Retrieved {} maintenances from database",
                maintenances.len()
            );
            let responses: Vec<MaintenanceResponse> = maintenances
                .into_iter()
                .map(MaintenanceResponse::from)
                .collect();
            Ok(Json(ApiEnvelope::success(
                responses,
                "Maintenances retrieved successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to retrieve maintenances: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific maintenance record by ID
#[utoipa::path(
    get,
    path = "/api/v1/maintenances/{maintenance_id}",
    tag = "maintenances",
    params(
        ("maintenance_id" = i32, Path, description = "Maintenance ID"),
    ),
    responses(
        (status = 200, description = "Maintenance retrieved successfully", body = ApiEnvelope<MaintenanceResponse>),
        (status = 404, description = "Maintenance not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_maintenance(
    Path(maintenance_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<MaintenanceResponse>>, StatusCode> {
    trace!(
        "Entering get_maintenance function for maintenance_id: {}",
        maintenance_id
    );

    match maintenance::Entity::find_by_id(maintenance_id)
        .one(&state.db)
        .await
    {
        Ok(Some(maintenance_model)) => Ok(Json(ApiEnvelope::success(
            MaintenanceResponse::from(maintenance_model),
            "Maintenance retrieved successfully",
        ))),
        Ok(None) => {
            warn!("Maintenance with ID {} not found", maintenance_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve maintenance with ID {}: {}",
                maintenance_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a maintenance record
#[utoipa::path(
    put,
    path = "/api/v1/maintenances/{maintenance_id}",
    tag = "maintenances",
    params(
        ("maintenance_id" = i32, Path, description = "Maintenance ID"),
    ),
    request_body = UpdateMaintenanceRequest,
    responses(
        (status = 200, description = "Maintenance updated successfully", body = ApiEnvelope<MaintenanceResponse>),
        (status = 404, description = "Maintenance not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn update_maintenance(
    Path(maintenance_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateMaintenanceRequest>,
) -> Result<Json<ApiEnvelope<MaintenanceResponse>>, StatusCode> {
    trace!(
        "Entering update_maintenance function for maintenance_id: {}",
        maintenance_id
    );

    let maintenance_type = match request.maintenance_type.as_deref() {
        Some(value) => match parse_maintenance_type(value) {
            Some(parsed) => Some(parsed),
            None => {
                warn!("Unknown maintenance type: {}", value);
                return Ok(Json(maintenance_type_error()));
            }
        },
        None => None,
    };

    let existing = match maintenance::Entity::find_by_id(maintenance_id)
        .one(&state.db)
        .await
    {
        Ok(Some(maintenance)) => maintenance,
        Ok(None) => {
            warn!(
                "Maintenance with ID {} not found for update",
                maintenance_id
            );
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup maintenance with ID {}: {}",
                maintenance_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut maintenance_active: maintenance::ActiveModel = existing.into();

    if let Some(maintenance_type) = maintenance_type {
        maintenance_active.maintenance_type = Set(maintenance_type);
    }
    if let Some(name) = request.name {
        maintenance_active.name = Set(name);
    }
    if let Some(start_date) = request.start_date {
        maintenance_active.start_date = Set(start_date);
    }
    if let Some(completion_date) = request.completion_date {
        maintenance_active.completion_date = Set(Some(completion_date));
    }
    if let Some(is_warranty) = request.is_warranty {
        maintenance_active.is_warranty = Set(is_warranty);
    }
    if let Some(cost) = request.cost {
        maintenance_active.cost = Set(Some(cost));
    }
    if let Some(notes) = request.notes {
        maintenance_active.notes = Set(Some(notes));
    }

    match maintenance_active.update(&state.db).await {
        Ok(updated) => {
            info!(
                "Maintenance with ID {} updated successfully",
                maintenance_id
            );
            Ok(Json(ApiEnvelope::success(
                MaintenanceResponse::from(updated),
                "Maintenance updated successfully",
            )))
        }
        Err(db_error) => {
            error!(
                "Failed to update maintenance with ID {}: {}",
                maintenance_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete a maintenance record
#[utoipa::path(
    delete,
    path = "/api/v1/maintenances/{maintenance_id}",
    tag = "maintenances",
    params(
        ("maintenance_id" = i32, Path, description = "Maintenance ID"),
    ),
    responses(
        (status = 200, description = "Maintenance deleted successfully", body = ApiEnvelope<String>),
        (status = 404, description = "Maintenance not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn delete_maintenance(
    Path(maintenance_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<String>>, StatusCode> {
    trace!(
        "Entering delete_maintenance function for maintenance_id: {}",
        maintenance_id
    );

    match maintenance::Entity::delete_by_id(maintenance_id)
        .exec(&state.db)
        .await
    {
        Ok(delete_result) if delete_result.rows_affected > 0 => {
            info!("Maintenance with ID {} deleted", maintenance_id);
            Ok(Json(ApiEnvelope::success(
                format!("Maintenance {maintenance_id} deleted"),
                "Maintenance deleted successfully",
            )))
        }
        Ok(_) => {
            warn!(
                "Maintenance with ID {} not found for deletion",
                maintenance_id
            );
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!(
                "Failed to delete maintenance with ID {}: {}",
                maintenance_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
