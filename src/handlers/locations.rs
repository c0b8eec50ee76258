use crate::schemas::{ApiEnvelope, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::location;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a location
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateLocationRequest {
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Request body for updating a location
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateLocationRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Location response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LocationResponse {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
}

impl From<location::Model> for LocationResponse {
    fn from(model: location::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            city: model.city,
        }
    }
}

/// Create a new location
#[utoipa::path(
    post,
    path = "/api/v1/locations",
    tag = "locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created successfully", body = ApiEnvelope<LocationResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn create_location(
    State(state): State<AppState>,
    Json(request): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<LocationResponse>>), StatusCode> {
    trace!("Entering create_location function");
    debug!("Creating location with name: {}", request.name);

    let new_location = location::ActiveModel {
        name: Set(request.name.clone()),
        address: Set(request.address.clone()),
        city: Set(request.city.clone()),
        ..Default::default()
    };

    match new_location.insert(&state.db).await {
        Ok(location_model) => {
            info!(
                "Location created successfully with ID: {}",
                location_model.id
            );
            Ok((
                StatusCode::CREATED,
                Json(ApiEnvelope::success(
                    LocationResponse::from(location_model),
                    "Location created successfully",
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to create location '{}': {}", request.name, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all locations
#[utoipa::path(
    get,
    path = "/api/v1/locations",
    tag = "locations",
    responses(
        (status = 200, description = "Locations retrieved successfully", body = ApiEnvelope<Vec<LocationResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_locations(
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<LocationResponse>>>, StatusCode> {
    trace!("Entering get_locations function");

    match location::Entity::find().all(&state.db).await {
        Ok(locations) => {
            debug!("Retrieved {} locations from database", locations.len());
            let responses: Vec<LocationResponse> =
                locations.into_iter().map(LocationResponse::from).collect();
            Ok(Json(ApiEnvelope::success(
                responses,
                "Locations retrieved successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to retrieve locations: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific location by ID
#[utoipa::path(
    get,
    path = "/api/v1/locations/{location_id}",
    tag = "locations",
    params(
        ("location_id" = i32, Path, description = "Location ID"),
    ),
    responses(
        (status = 200, description = "Location retrieved successfully", body = ApiEnvelope<LocationResponse>),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_location(
    Path(location_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<LocationResponse>>, StatusCode> {
    trace!("Entering get_location function for location_id: {}", location_id);

    match location::Entity::find_by_id(location_id).one(&state.db).await {
        Ok(Some(location_model)) => Ok(Json(ApiEnvelope::success(
            LocationResponse::from(location_model),
            "Location retrieved successfully",
        ))),
        Ok(None) => {
            warn!("Location with ID {} not found", location_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve location with ID {}: {}",
                location_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a location
#[utoipa::path(
    put,
    path = "/api/v1/locations/{location_id}",
    tag = "locations",
    params(
        ("location_id" = i32, Path, description = "Location ID"),
    ),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Location updated successfully", body = ApiEnvelope<LocationResponse>),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn update_location(
    Path(location_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateLocationRequest>,
) -> Result<Json<ApiEnvelope<LocationResponse>>, StatusCode> {
    trace!("Entering update_location function for location_id: {}", location_id);

    let existing = match location::Entity::find_by_id(location_id).one(&state.db).await {
        Ok(Some(location)) => location,
        Ok(None) => {
            warn!("Location with ID {} not found for update", location_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup location with ID {}: {}",
                location_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut location_active: location::ActiveModel = existing.into();

    if let Some(name) = request.name {
        location_active.name = Set(name);
    }
    if let Some(address) = request.address {
        location_active.address = Set(Some(address));
    }
    if let Some(city) = request.city {
        location_active.city = Set(Some(city));
    }

    match location_active.update(&state.db).await {
        Ok(updated) => {
            info!("Location with ID {} updated successfully", location_id);
            Ok(Json(ApiEnvelope::success(
                LocationResponse::from(updated),
                "Location updated successfully",
            )))
        }
        Err(db_error) => {
            error!(
                "Failed to update location with ID {}: {}",
                location_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete a location
#[utoipa::path(
    delete,
    path = "/api/v1/locations/{location_id}",
    tag = "locations",
    params(
        ("location_id" = i32, Path, description = "Location ID"),
    ),
    responses(
        (status = 200, description = "Location deleted successfully", body = ApiEnvelope<String>),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn delete_location(
    Path(location_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<String>>, StatusCode> {
    trace!("Entering delete_location function for location_id: {}", location_id);

    match location::Entity::delete_by_id(location_id).exec(&state.db).await {
        Ok(delete_result) if delete_result.rows_affected > 0 => {
            info!("Location with ID {} deleted", location_id);
            Ok(Json(ApiEnvelope::success(
                format!("Location {location_id} deleted"),
                "Location deleted successfully",
            )))
        }
        Ok(_) => {
            warn!("Location with ID {} not found for deletion", location_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!(
                "Failed to delete location with ID {}: {}",
                location_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
