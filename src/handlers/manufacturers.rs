use crate::schemas::{ApiEnvelope, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::manufacturer;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a manufacturer
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateManufacturerRequest {
    pub name: String,
    #[validate(url(message = "The url field must be a valid URL."))]
    pub url: Option<String>,
    #[validate(email(message = "The support_email field must be a valid email address."))]
    pub support_email: Option<String>,
}

/// Request body for updating a manufacturer
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateManufacturerRequest {
    pub name: Option<String>,
    #[validate(url(message = "The url field must be a valid URL."))]
    pub url: Option<String>,
    #[validate(email(message = "The support_email field must be a valid email address."))]
    pub support_email: Option<String>,
}

/// Manufacturer response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ManufacturerResponse {
    pub id: i32,
    pub name: String,
    pub url: Option<String>,
    pub support_email: Option<String>,
}

impl From<manufacturer::Model> for ManufacturerResponse {
    fn from(model: manufacturer::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            url: model.url,
            support_email: model.support_email,
        }
    }
}

/// Create a new manufacturer
#[utoipa::path(
    post,
    path = "/api/v1/manufacturers",
    tag = "manufacturers",
    request_body = CreateManufacturerRequest,
    responses(
        (status = 201, description = "Manufacturer created successfully", body = ApiEnvelope<ManufacturerResponse>),
        (status = 200, description = "Validation failed", body = ApiEnvelope<serde_json::Value>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn create_manufacturer(
    State(state): State<AppState>,
    Json(request): Json<CreateManufacturerRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<ManufacturerResponse>>), StatusCode> {
    trace!("Entering create_manufacturer function");
    debug!("Creating manufacturer with name: {}", request.name);

    if let Err(errors) = request.validate() {
        warn!("Manufacturer validation failed: {}", errors);
        return Ok((StatusCode::OK, Json(ApiEnvelope::from_validation(&errors))));
    }

    let new_manufacturer = manufacturer::ActiveModel {
        name: Set(request.name.clone()),
        url: Set(request.url.clone()),
        support_email: Set(request.support_email.clone()),
        ..Default::default()
    };

    match new_manufacturer.insert(&state.db).await {
        Ok(manufacturer_model) => {
            info!(
                "Manufacturer created successfully with ID: {}",
                manufacturer_model.id
            );
            Ok((
                StatusCode::CREATED,
                Json(ApiEnvelope::success(
                    ManufacturerResponse::from(manufacturer_model),
                    "Manufacturer created successfully",
                )),
            ))
        }
        Err(db_error) => {
            error!(
                "Failed to create manufacturer '{}': {}",
                request.name, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all manufacturers
#[utoipa::path(
    get,
    path = "/api/v1/manufacturers",
    tag = "manufacturers",
    responses(
        (status = 200, description = "Manufacturers retrieved successfully", body = ApiEnvelope<Vec<ManufacturerResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_manufacturers(
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<ManufacturerResponse>>>, StatusCode> {
    trace!("Entering get_manufacturers function");

    match manufacturer::Entity::find().all(&state.db).await {
        Ok(manufacturers) => {
            debug!(
                "Retrieved {} manufacturers from database",
                manufacturers.len()
            );
            let responses: Vec<ManufacturerResponse> = manufacturers
                .into_iter()
                .map(ManufacturerResponse::from)
                .collect();
            Ok(Json(ApiEnvelope::success(
                responses,
                "Manufacturers retrieved successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to retrieve manufacturers: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific manufacturer by ID
#[utoipa::path(
    get,
    path = "/api/v1/manufacturers/{manufacturer_id}",
    tag = "manufacturers",
    params(
        ("manufacturer_id" = i32, Path, description = "Manufacturer ID"),
    ),
    responses(
        (status = 200, description = "Manufacturer retrieved successfully", body = ApiEnvelope<ManufacturerResponse>),
        (status = 404, description = "Manufacturer not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_manufacturer(
    Path(manufacturer_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<ManufacturerResponse>>, StatusCode> {
    trace!(
        "Entering get_manufacturer function for manufacturer_id: {}",
        manufacturer_id
    );

    match manufacturer::Entity::find_by_id(manufacturer_id)
        .one(&state.db)
        .await
    {
        Ok(Some(manufacturer_model)) => Ok(Json(ApiEnvelope::success(
            ManufacturerResponse::from(manufacturer_model),
            "Manufacturer retrieved successfully",
        ))),
        Ok(None) => {
            warn!("Manufacturer with ID {} not found", manufacturer_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve manufacturer with ID {}: {}",
                manufacturer_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a manufacturer
#[utoipa::path(
    put,
    path = "/api/v1/manufacturers/{manufacturer_id}",
    tag = "manufacturers",
    params(
        ("manufacturer_id" = i32, Path, description = "Manufacturer ID"),
    ),
    request_body = UpdateManufacturerRequest,
    responses(
        (status = 200, description = "Manufacturer updated successfully", body = ApiEnvelope<ManufacturerResponse>),
        (status = 404, description = "Manufacturer not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn update_manufacturer(
    Path(manufacturer_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateManufacturerRequest>,
) -> Result<Json<ApiEnvelope<ManufacturerResponse>>, StatusCode> {
    trace!(
        "Entering update_manufacturer function for manufacturer_id: {}",
        manufacturer_id
    );

    if let Err(errors) = request.validate() {
        warn!("Manufacturer validation failed: {}", errors);
        return Ok(Json(ApiEnvelope::from_validation(&errors)));
    }

    let existing = match manufacturer::Entity::find_by_id(manufacturer_id)
        .one(&state.db)
        .await
    {
        Ok(Some(manufacturer)) => manufacturer,
        Ok(None) => {
            warn!(
                "Manufacturer with ID {} not found for update",
                manufacturer_id
            );
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup manufacturer with ID {}: {}",
                manufacturer_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut manufacturer_active: manufacturer::ActiveModel = existing.into();

    if let Some(name) = request.name {
        manufacturer_active.name = Set(name);
    }
    if let Some(url) = request.url {
        manufacturer_active.url = Set(Some(url));
    }
    if let Some(support_email) = request.support_email {
        manufacturer_active.support_email = Set(Some(support_email));
    }

    match manufacturer_active.update(&state.db).await {
        Ok(updated) => {
            info!(
                "Manufacturer with ID {} updated successfully",
                manufacturer_id
            );
            Ok(Json(ApiEnvelope::success(
                ManufacturerResponse::from(updated),
                "Manufacturer updated successfully",
            )))
        }
        Err(db_error) => {
            error!(
                "Failed to update manufacturer with ID {}: {}",
                manufacturer_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete a manufacturer
#[utoipa::path(
    delete,
    path = "/api/v1/manufacturers/{manufacturer_id}",
    tag = "manufacturers",
    params(
        ("manufacturer_id" = i32, Path, description = "Manufacturer ID"),
    ),
    responses(
        (status = 200, description = "Manufacturer deleted successfully", body = ApiEnvelope<String>),
        (status = 404, description = "Manufacturer not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn delete_manufacturer(
    Path(manufacturer_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<String>>, StatusCode> {
    trace!(
        "Entering delete_manufacturer function for manufacturer_id: {}",
        manufacturer_id
    );

    match manufacturer::Entity::delete_by_id(manufacturer_id)
        .exec(&state.db)
        .await
    {
        Ok(delete_result) if delete_result.rows_affected > 0 => {
            info!("Manufacturer with ID {} deleted", manufacturer_id);
            Ok(Json(ApiEnvelope::success(
                format!("Manufacturer {manufacturer_id} deleted"),
                "Manufacturer deleted successfully",
            )))
        }
        Ok(_) => {
            warn!(
                "Manufacturer with ID {} not found for deletion",
                manufacturer_id
            );
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!(
                "Failed to delete manufacturer with ID {}: {}",
                manufacturer_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
