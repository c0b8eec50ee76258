use crate::audit::{self, AuditEntry, ITEM_LICENSE};
use crate::config::utilization_cache_key;
use crate::schemas::{ApiEnvelope, AppState, CachedData, SeatUtilization};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use model::entities::{action_log::ActionType, license, license_seat};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a license
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateLicenseRequest {
    pub name: String,
    pub product_key: Option<String>,
    /// Number of seats to provision (defaults to 1)
    pub seats: Option<i32>,
    /// When false, a checked-in seat can never be handed out again
    pub reassignable: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub purchase_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub category_id: Option<i32>,
    pub created_by: Option<i32>,
}

/// Request body for updating a license.
///
/// The seat count is fixed at creation; seat rows are not resized here.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateLicenseRequest {
    pub name: Option<String>,
    pub product_key: Option<String>,
    pub reassignable: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub purchase_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub category_id: Option<i32>,
}

/// License response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LicenseResponse {
    pub id: i32,
    pub name: String,
    pub product_key: Option<String>,
    pub seats: i32,
    pub reassignable: bool,
    #[schema(value_type = Option<String>)]
    pub purchase_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub category_id: Option<i32>,
}

impl From<license::Model> for LicenseResponse {
    fn from(model: license::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            product_key: model.product_key,
            seats: model.seats,
            reassignable: model.reassignable,
            purchase_cost: model.purchase_cost,
            notes: model.notes,
            category_id: model.category_id,
        }
    }
}

/// Create a license and provision its seat rows
#[utoipa::path(
    post,
    path = "/api/v1/licenses",
    tag = "licenses",
    request_body = CreateLicenseRequest,
    responses(
        (status = 201, description = "License created successfully", body = ApiEnvelope<LicenseResponse>),
        (status = 200, description = "Validation failed", body = ApiEnvelope<serde_json::Value>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn create_license(
    State(state): State<AppState>,
    Json(request): Json<CreateLicenseRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<LicenseResponse>>), StatusCode> {
    trace!("Entering create_license function");
    debug!("Creating license with name: {}", request.name);

    let seat_count = request.seats.unwrap_or(1);
    if seat_count < 1 {
        warn!("Rejected license with seat count {}", seat_count);
        return Ok((
            StatusCode::OK,
            Json(ApiEnvelope::error("A license needs at least one seat")),
        ));
    }

    let new_license = license::ActiveModel {
        name: Set(request.name.clone()),
        product_key: Set(request.product_key.clone()),
        seats: Set(seat_count),
        reassignable: Set(request.reassignable.unwrap_or(true)),
        purchase_cost: Set(request.purchase_cost),
        notes: Set(request.notes.clone()),
        category_id: Set(request.category_id),
        ..Default::default()
    };

    let license_model = match new_license.insert(&state.db).await {
        Ok(license_model) => license_model,
        Err(db_error) => {
            error!("Failed to create license '{}': {}", request.name, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // One seat row per seat in the count.
    for _ in 0..seat_count {
        let seat = license_seat::ActiveModel {
            license_id: Set(license_model.id),
            created_by: Set(request.created_by),
            ..Default::default()
        };
        if let Err(db_error) = seat.insert(&state.db).await {
            error!(
                "Failed to provision seat for license {}: {}",
                license_model.id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    info!(
        "License created successfully with ID: {}, {} seats provisioned",
        license_model.id, seat_count
    );

    let create_log = AuditEntry::new(ActionType::Create, ITEM_LICENSE, license_model.id)
        .created_by(request.created_by);
    if let Err(db_error) = audit::record(&state.db, create_log).await {
        warn!("Failed to write license creation audit entry: {}", db_error);
    }
    let seats_log = AuditEntry::new(ActionType::AddSeats, ITEM_LICENSE, license_model.id)
        .note(Some(format!("{seat_count} seats")))
        .created_by(request.created_by);
    if let Err(db_error) = audit::record(&state.db, seats_log).await {
        warn!("Failed to write seat provisioning audit entry: {}", db_error);
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::success(
            LicenseResponse::from(license_model),
            "License created successfully",
        )),
    ))
}

/// Get all licenses (excluding soft-deleted ones)
#[utoipa::path(
    get,
    path = "/api/v1/licenses",
    tag = "licenses",
    responses(
        (status = 200, description = "Licenses retrieved successfully", body = ApiEnvelope<Vec<LicenseResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_licenses(
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<LicenseResponse>>>, StatusCode> {
    trace!("Entering get_licenses function");

    match license::Entity::find()
        .filter(license::Column::DeletedAt.is_null())
        .all(&state.db)
        .await
    {
        Ok(licenses) => {
            debug!("Retrieved {} licenses from database", licenses.len());
            let responses: Vec<LicenseResponse> =
                licenses.into_iter().map(LicenseResponse::from).collect();
            Ok(Json(ApiEnvelope::success(
                responses,
                "Licenses retrieved successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to retrieve licenses: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific license by ID
#[utoipa::path(
    get,
    path = "/api/v1/licenses/{license_id}",
    tag = "licenses",
    params(
        ("license_id" = i32, Path, description = "License ID"),
    ),
    responses(
        (status = 200, description = "License retrieved successfully", body = ApiEnvelope<LicenseResponse>),
        (status = 404, description = "License not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_license(
    Path(license_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<LicenseResponse>>, StatusCode> {
    trace!("Entering get_license function for license_id: {}", license_id);

    match license::Entity::find_by_id(license_id).one(&state.db).await {
        Ok(Some(license_model)) if !license_model.is_deleted() => Ok(Json(ApiEnvelope::success(
            LicenseResponse::from(license_model),
            "License retrieved successfully",
        ))),
        Ok(_) => {
            warn!("License with ID {} not found", license_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve license with ID {}: {}",
                license_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a license
#[utoipa::path(
    put,
    path = "/api/v1/licenses/{license_id}",
    tag = "licenses",
    params(
        ("license_id" = i32, Path, description = "License ID"),
    ),
    request_body = UpdateLicenseRequest,
    responses(
        (status = 200, description = "License updated successfully", body = ApiEnvelope<LicenseResponse>),
        (status = 404, description = "License not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn update_license(
    Path(license_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateLicenseRequest>,
) -> Result<Json<ApiEnvelope<LicenseResponse>>, StatusCode> {
    trace!("Entering update_license function for license_id: {}", license_id);

    let existing = match license::Entity::find_by_id(license_id).one(&state.db).await {
        Ok(Some(license)) if !license.is_deleted() => license,
        Ok(_) => {
            warn!("License with ID {} not found for update", license_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup license with ID {}: {}",
                license_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut license_active: license::ActiveModel = existing.into();

    if let Some(name) = request.name {
        license_active.name = Set(name);
    }
    if let Some(product_key) = request.product_key {
        license_active.product_key = Set(Some(product_key));
    }
    if let Some(reassignable) = request.reassignable {
        license_active.reassignable = Set(reassignable);
    }
    if let Some(purchase_cost) = request.purchase_cost {
        license_active.purchase_cost = Set(Some(purchase_cost));
    }
    if let Some(notes) = request.notes {
        license_active.notes = Set(Some(notes));
    }
    if let Some(category_id) = request.category_id {
        license_active.category_id = Set(Some(category_id));
    }

    match license_active.update(&state.db).await {
        Ok(updated) => {
            info!("License with ID {} updated successfully", license_id);
            let log = AuditEntry::new(ActionType::Update, ITEM_LICENSE, license_id);
            if let Err(db_error) = audit::record(&state.db, log).await {
                warn!("Failed to write license update audit entry: {}", db_error);
            }
            Ok(Json(ApiEnvelope::success(
                LicenseResponse::from(updated),
                "License updated successfully",
            )))
        }
        Err(db_error) => {
            error!(
                "Failed to update license with ID {}: {}",
                license_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Soft-delete a license
#[utoipa::path(
    delete,
    path = "/api/v1/licenses/{license_id}",
    tag = "licenses",
    params(
        ("license_id" = i32, Path, description = "License ID"),
    ),
    responses(
        (status = 200, description = "License deleted, or license still has assigned seats", body = ApiEnvelope<String>),
        (status = 404, description = "License not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn delete_license(
    Path(license_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<String>>, StatusCode> {
    trace!("Entering delete_license function for license_id: {}", license_id);

    let existing = match license::Entity::find_by_id(license_id).one(&state.db).await {
        Ok(Some(license)) if !license.is_deleted() => license,
        Ok(_) => {
            warn!("License with ID {} not found for deletion", license_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup license with ID {}: {}",
                license_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // A license with assigned seats must have them checked in first.
    let assigned = match license_seat::Entity::find()
        .filter(license_seat::Column::LicenseId.eq(license_id))
        .filter(license_seat::Column::DeletedAt.is_null())
        .filter(
            Condition::any()
                .add(license_seat::Column::AssignedTo.is_not_null())
                .add(license_seat::Column::AssetId.is_not_null()),
        )
        .count(&state.db)
        .await
    {
        Ok(count) => count,
        Err(db_error) => {
            error!(
                "Failed to count assigned seats for license {}: {}",
                license_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    if assigned > 0 {
        debug!(
            "License {} still has {} assigned seats, refusing delete",
            license_id, assigned
        );
        return Ok(Json(ApiEnvelope::error(
            "License cannot be deleted while seats are checked out",
        )));
    }

    let now = Utc::now().naive_utc();
    let mut license_active: license::ActiveModel = existing.into();
    license_active.deleted_at = Set(Some(now));

    match license_active.update(&state.db).await {
        Ok(_) => {
            info!("License with ID {} soft-deleted", license_id);
            let log = AuditEntry::new(ActionType::Delete, ITEM_LICENSE, license_id);
            if let Err(db_error) = audit::record(&state.db, log).await {
                warn!("Failed to write license deletion audit entry: {}", db_error);
            }
            state.cache.invalidate(&utilization_cache_key(license_id)).await;
            Ok(Json(ApiEnvelope::success(
                format!("License {license_id} deleted"),
                "License deleted successfully",
            )))
        }
        Err(db_error) => {
            error!(
                "Failed to delete license with ID {}: {}",
                license_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Seat utilization counts for a license
#[utoipa::path(
    get,
    path = "/api/v1/licenses/{license_id}/utilization",
    tag = "licenses",
    params(
        ("license_id" = i32, Path, description = "License ID"),
    ),
    responses(
        (status = 200, description = "Utilization retrieved successfully", body = ApiEnvelope<SeatUtilization>),
        (status = 404, description = "License not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_license_utilization(
    Path(license_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<SeatUtilization>>, StatusCode> {
    trace!(
        "Entering get_license_utilization for license_id: {}",
        license_id
    );

    let cache_key = utilization_cache_key(license_id);
    if let Some(CachedData::Utilization(utilization)) = state.cache.get(&cache_key).await {
        debug!("Utilization cache hit for license {}", license_id);
        return Ok(Json(ApiEnvelope::success(
            utilization,
            "Utilization retrieved successfully",
        )));
    }

    match license::Entity::find_by_id(license_id).one(&state.db).await {
        Ok(Some(license)) if !license.is_deleted() => license,
        Ok(_) => {
            warn!("License with ID {} not found", license_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup license with ID {}: {}",
                license_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let live_seats = license_seat::Entity::find()
        .filter(license_seat::Column::LicenseId.eq(license_id))
        .filter(license_seat::Column::DeletedAt.is_null());

    let total = match live_seats.clone().count(&state.db).await {
        Ok(total) => total,
        Err(db_error) => {
            error!("Failed to count seats for license {}: {}", license_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    let assigned = match live_seats
        .filter(
            Condition::any()
                .add(license_seat::Column::AssignedTo.is_not_null())
                .add(license_seat::Column::AssetId.is_not_null()),
        )
        .count(&state.db)
        .await
    {
        Ok(assigned) => assigned,
        Err(db_error) => {
            error!(
                "Failed to count assigned seats for license {}: {}",
                license_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let utilization = SeatUtilization {
        license_id,
        total,
        assigned,
        available: total - assigned,
    };

    state
        .cache
        .insert(cache_key, CachedData::Utilization(utilization.clone()))
        .await;
    debug!(
        "Utilization for license {}: {}/{} seats assigned",
        license_id, utilization.assigned, utilization.total
    );

    Ok(Json(ApiEnvelope::success(
        utilization,
        "Utilization retrieved successfully",
    )))
}
