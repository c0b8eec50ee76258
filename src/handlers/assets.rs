use crate::audit::{self, AuditEntry, ITEM_ASSET, TARGET_LOCATION, TARGET_USER};
use crate::notifications::events::{AppEvent, BulkCheckedOut, CheckoutTarget};
use crate::schemas::{ApiEnvelope, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use model::entities::{action_log::ActionType, asset, category, location, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating an asset
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateAssetRequest {
    /// Asset tag (must be unique)
    pub asset_tag: String,
    pub serial: String,
    pub name: Option<String>,
    pub category_id: i32,
    pub manufacturer_id: Option<i32>,
    pub location_id: Option<i32>,
}

/// Request body for updating an asset
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateAssetRequest {
    pub asset_tag: Option<String>,
    pub serial: Option<String>,
    pub name: Option<String>,
    pub category_id: Option<i32>,
    pub manufacturer_id: Option<i32>,
    pub location_id: Option<i32>,
}

/// Asset response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssetResponse {
    pub id: i32,
    pub asset_tag: String,
    pub serial: String,
    pub name: Option<String>,
    pub category_id: i32,
    pub manufacturer_id: Option<i32>,
    pub location_id: Option<i32>,
    pub assigned_to: Option<i32>,
}

impl From<asset::Model> for AssetResponse {
    fn from(model: asset::Model) -> Self {
        Self {
            id: model.id,
            asset_tag: model.asset_tag,
            serial: model.serial,
            name: model.name,
            category_id: model.category_id,
            manufacturer_id: model.manufacturer_id,
            location_id: model.location_id,
            assigned_to: model.assigned_to,
        }
    }
}

/// Request body for the bulk checkout operation.
///
/// Exactly one of `assigned_user` / `assigned_location` names the target.
/// `checkout_by` identifies the admin performing the checkout and is the
/// attributed author of the audit rows and the notification.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct BulkCheckoutRequest {
    pub asset_ids: Vec<i32>,
    pub assigned_user: Option<i32>,
    pub assigned_location: Option<i32>,
    pub checkout_by: i32,
    pub checkout_at: Option<NaiveDateTime>,
    pub expected_checkin: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Create a new asset
#[utoipa::path(
    post,
    path = "/api/v1/assets",
    tag = "assets",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset created successfully", body = ApiEnvelope<AssetResponse>),
        (status = 200, description = "Validation failed", body = ApiEnvelope<serde_json::Value>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn create_asset(
    State(state): State<AppState>,
    Json(request): Json<CreateAssetRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<AssetResponse>>), StatusCode> {
    trace!("Entering create_asset function");
    debug!("Creating asset with tag: {}", request.asset_tag);

    match category::Entity::find_by_id(request.category_id)
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Category with ID {} not found", request.category_id);
            return Ok((
                StatusCode::OK,
                Json(ApiEnvelope::error("Category not found")),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup category with ID {}: {}",
                request.category_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let new_asset = asset::ActiveModel {
        asset_tag: Set(request.asset_tag.clone()),
        serial: Set(request.serial.clone()),
        name: Set(request.name.clone()),
        category_id: Set(request.category_id),
        manufacturer_id: Set(request.manufacturer_id),
        location_id: Set(request.location_id),
        ..Default::default()
    };

    match new_asset.insert(&state.db).await {
        Ok(asset_model) => {
            info!(
                "Asset created successfully with ID: {}, tag: {}",
                asset_model.id, asset_model.asset_tag
            );
            let log = AuditEntry::new(ActionType::Create, ITEM_ASSET, asset_model.id);
            if let Err(db_error) = audit::record(&state.db, log).await {
                warn!("Failed to write asset creation audit entry: {}", db_error);
            }
            Ok((
                StatusCode::CREATED,
                Json(ApiEnvelope::success(
                    AssetResponse::from(asset_model),
                    "Asset created successfully",
                )),
            ))
        }
        Err(db_error) => {
            error!(
                "Failed to create asset '{}': {}",
                request.asset_tag, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all assets (excluding soft-deleted ones)
#[utoipa::path(
    get,
    path = "/api/v1/assets",
    tag = "assets",
    responses(
        (status = 200, description = "Assets retrieved successfully", body = ApiEnvelope<Vec<AssetResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_assets(
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<AssetResponse>>>, StatusCode> {
    trace!("Entering get_assets function");

    match asset::Entity::find()
        .filter(asset::Column::DeletedAt.is_null())
        .all(&state.db)
        .await
    {
        Ok(assets) => {
            debug!("Retrieved {} assets from database", assets.len());
            let responses: Vec<AssetResponse> =
                assets.into_iter().map(AssetResponse::from).collect();
            Ok(Json(ApiEnvelope::success(
                responses,
                "Assets retrieved successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to retrieve assets: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific asset by ID
#[utoipa::path(
    get,
    path = "/api/v1/assets/{asset_id}",
    tag = "assets",
    params(
        ("asset_id" = i32, Path, description = "Asset ID"),
    ),
    responses(
        (status = 200, description = "Asset retrieved successfully", body = ApiEnvelope<AssetResponse>),
        (status = 404, description = "Asset not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_asset(
    Path(asset_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<AssetResponse>>, StatusCode> {
    trace!("Entering get_asset function for asset_id: {}", asset_id);

    match asset::Entity::find_by_id(asset_id).one(&state.db).await {
        Ok(Some(asset_model)) if !asset_model.is_deleted() => Ok(Json(ApiEnvelope::success(
            AssetResponse::from(asset_model),
            "Asset retrieved successfully",
        ))),
        Ok(_) => {
            warn!("Asset with ID {} not found", asset_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve asset with ID {}: {}", asset_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update an asset
#[utoipa::path(
    put,
    path = "/api/v1/assets/{asset_id}",
    tag = "assets",
    params(
        ("asset_id" = i32, Path, description = "Asset ID"),
    ),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated successfully", body = ApiEnvelope<AssetResponse>),
        (status = 404, description = "Asset not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn update_asset(
    Path(asset_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateAssetRequest>,
) -> Result<Json<ApiEnvelope<AssetResponse>>, StatusCode> {
    trace!("Entering update_asset function for asset_id: {}", asset_id);

    let existing = match asset::Entity::find_by_id(asset_id).one(&state.db).await {
        Ok(Some(asset)) if !asset.is_deleted() => asset,
        Ok(_) => {
            warn!("Asset with ID {} not found for update", asset_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to lookup asset with ID {}: {}", asset_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut asset_active: asset::ActiveModel = existing.into();

    if let Some(asset_tag) = request.asset_tag {
        asset_active.asset_tag = Set(asset_tag);
    }
    if let Some(serial) = request.serial {
        asset_active.serial = Set(serial);
    }
    if let Some(name) = request.name {
        asset_active.name = Set(Some(name));
    }
    if let Some(category_id) = request.category_id {
        asset_active.category_id = Set(category_id);
    }
    if let Some(manufacturer_id) = request.manufacturer_id {
        asset_active.manufacturer_id = Set(Some(manufacturer_id));
    }
    if let Some(location_id) = request.location_id {
        asset_active.location_id = Set(Some(location_id));
    }
    asset_active.updated_at = Set(Utc::now().naive_utc());

    match asset_active.update(&state.db).await {
        Ok(updated) => {
            info!("Asset with ID {} updated successfully", asset_id);
            let log = AuditEntry::new(ActionType::Update, ITEM_ASSET, asset_id);
            if let Err(db_error) = audit::record(&state.db, log).await {
                warn!("Failed to write asset update audit entry: {}", db_error);
            }
            Ok(Json(ApiEnvelope::success(
                AssetResponse::from(updated),
                "Asset updated successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to update asset with ID {}: {}", asset_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Soft-delete an asset
#[utoipa::path(
    delete,
    path = "/api/v1/assets/{asset_id}",
    tag = "assets",
    params(
        ("asset_id" = i32, Path, description = "Asset ID"),
    ),
    responses(
        (status = 200, description = "Asset deleted successfully", body = ApiEnvelope<String>),
        (status = 404, description = "Asset not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn delete_asset(
    Path(asset_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<String>>, StatusCode> {
    trace!("Entering delete_asset function for asset_id: {}", asset_id);

    let existing = match asset::Entity::find_by_id(asset_id).one(&state.db).await {
        Ok(Some(asset)) if !asset.is_deleted() => asset,
        Ok(_) => {
            warn!("Asset with ID {} not found for deletion", asset_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to lookup asset with ID {}: {}", asset_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut asset_active: asset::ActiveModel = existing.into();
    asset_active.deleted_at = Set(Some(Utc::now().naive_utc()));

    match asset_active.update(&state.db).await {
        Ok(_) => {
            info!("Asset with ID {} soft-deleted", asset_id);
            let log = AuditEntry::new(ActionType::Delete, ITEM_ASSET, asset_id);
            if let Err(db_error) = audit::record(&state.db, log).await {
                warn!("Failed to write asset deletion audit entry: {}", db_error);
            }
            Ok(Json(ApiEnvelope::success(
                format!("Asset {asset_id} deleted"),
                "Asset deleted successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to delete asset with ID {}: {}", asset_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Check out a batch of assets to a user or location
#[utoipa::path(
    post,
    path = "/api/v1/assets/checkout",
    tag = "assets",
    request_body = BulkCheckoutRequest,
    responses(
        (status = 200, description = "Assets checked out, or validation failed", body = ApiEnvelope<Vec<AssetResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip(state))]
pub async fn bulk_checkout(
    State(state): State<AppState>,
    Json(request): Json<BulkCheckoutRequest>,
) -> Result<Json<ApiEnvelope<Vec<AssetResponse>>>, StatusCode> {
    trace!("Entering bulk_checkout function");
    debug!(
        "Bulk checkout of {} assets requested",
        request.asset_ids.len()
    );

    let mut field_errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

    if request.asset_ids.is_empty() {
        field_errors
            .entry("asset_ids".to_string())
            .or_default()
            .push("At least one asset must be selected.".to_string());
    }

    // The target is exactly one of a user or a location.
    let target = match (request.assigned_user, request.assigned_location) {
        (Some(_), Some(_)) => {
            let message = "Provide either assigned_user or assigned_location, not both.";
            field_errors
                .entry("assigned_user".to_string())
                .or_default()
                .push(message.to_string());
            field_errors
                .entry("assigned_location".to_string())
                .or_default()
                .push(message.to_string());
            None
        }
        (None, None) => {
            field_errors
                .entry("assigned_user".to_string())
                .or_default()
                .push("A checkout target is required.".to_string());
            None
        }
        (Some(user_id), None) => {
            match user::Entity::find_by_id(user_id).one(&state.db).await {
                Ok(Some(user)) if !user.is_deleted() => Some(CheckoutTarget::User(user)),
                Ok(_) => {
                    field_errors
                        .entry("assigned_user".to_string())
                        .or_default()
                        .push(format!("User {user_id} not found."));
                    None
                }
                Err(db_error) => {
                    error!("Failed to lookup user with ID {}: {}", user_id, db_error);
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        }
        (None, Some(location_id)) => {
            match location::Entity::find_by_id(location_id).one(&state.db).await {
                Ok(Some(location)) => Some(CheckoutTarget::Location(location)),
                Ok(None) => {
                    field_errors
                        .entry("assigned_location".to_string())
                        .or_default()
                        .push(format!("Location {location_id} not found."));
                    None
                }
                Err(db_error) => {
                    error!(
                        "Failed to lookup location with ID {}: {}",
                        location_id, db_error
                    );
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        }
    };

    let admin = match user::Entity::find_by_id(request.checkout_by)
        .one(&state.db)
        .await
    {
        Ok(Some(admin)) if !admin.is_deleted() => Some(admin),
        Ok(_) => {
            field_errors
                .entry("checkout_by".to_string())
                .or_default()
                .push(format!("User {} not found.", request.checkout_by));
            None
        }
        Err(db_error) => {
            error!(
                "Failed to lookup user with ID {}: {}",
                request.checkout_by, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Every asset must exist, be live, and be free. Repeated ids would pass
    // the free check twice, so they are rejected outright.
    let mut seen: BTreeSet<i32> = BTreeSet::new();
    let mut checked: Vec<asset::Model> = Vec::with_capacity(request.asset_ids.len());
    for asset_id in &request.asset_ids {
        if !seen.insert(*asset_id) {
            field_errors
                .entry("asset_ids".to_string())
                .or_default()
                .push(format!("Asset {asset_id} is listed more than once."));
            continue;
        }
        match asset::Entity::find_by_id(*asset_id).one(&state.db).await {
            Ok(Some(asset)) if asset.is_deleted() => {
                field_errors
                    .entry("asset_ids".to_string())
                    .or_default()
                    .push(format!("Asset {asset_id} not found."));
            }
            Ok(Some(asset)) if asset.is_assigned() => {
                field_errors
                    .entry("asset_ids".to_string())
                    .or_default()
                    .push(format!("Asset {asset_id} is already checked out."));
            }
            Ok(Some(asset)) => checked.push(asset),
            Ok(None) => {
                field_errors
                    .entry("asset_ids".to_string())
                    .or_default()
                    .push(format!("Asset {asset_id} not found."));
            }
            Err(db_error) => {
                error!("Failed to lookup asset with ID {}: {}", asset_id, db_error);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }

    let (target, admin) = match (target, admin) {
        (Some(target), Some(admin)) if field_errors.is_empty() => (target, admin),
        _ => {
            warn!("Bulk checkout validation failed: {:?}", field_errors);
            return Ok(Json(ApiEnvelope::field_errors(field_errors)));
        }
    };

    let checkout_at = request
        .checkout_at
        .unwrap_or_else(|| Utc::now().naive_utc());

    // Assign every asset, keeping the category alongside for the
    // notification listener.
    let mut checked_out: Vec<(asset::Model, category::Model)> = Vec::with_capacity(checked.len());
    for asset_model in checked {
        let asset_id = asset_model.id;
        let category = match category::Entity::find_by_id(asset_model.category_id)
            .one(&state.db)
            .await
        {
            Ok(Some(category)) => category,
            Ok(None) => {
                error!("Category {} missing for asset {}", asset_model.category_id, asset_id);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
            Err(db_error) => {
                error!("Failed to lookup category: {}", db_error);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        let mut asset_active: asset::ActiveModel = asset_model.into();
        match &target {
            CheckoutTarget::User(user) => {
                asset_active.assigned_to = Set(Some(user.id));
            }
            CheckoutTarget::Location(location) => {
                asset_active.location_id = Set(Some(location.id));
            }
        }
        asset_active.updated_at = Set(checkout_at);

        let updated = match asset_active.update(&state.db).await {
            Ok(updated) => updated,
            Err(db_error) => {
                error!("Failed to check out asset {}: {}", asset_id, db_error);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        let log_target = match &target {
            CheckoutTarget::User(user) => (TARGET_USER, user.id),
            CheckoutTarget::Location(location) => (TARGET_LOCATION, location.id),
        };
        let log = AuditEntry::new(ActionType::Checkout, ITEM_ASSET, updated.id)
            .target(log_target.0, log_target.1)
            .note(request.note.clone())
            .created_by(Some(admin.id));
        if let Err(db_error) = audit::record(&state.db, log).await {
            warn!("Failed to write checkout audit entry: {}", db_error);
        }

        checked_out.push((updated, category));
    }

    info!(
        "Checked out {} assets to {}",
        checked_out.len(),
        target.name()
    );

    let responses: Vec<AssetResponse> = checked_out
        .iter()
        .map(|(asset, _)| AssetResponse::from(asset.clone()))
        .collect();

    let event = AppEvent::BulkCheckedOut(BulkCheckedOut {
        assets: checked_out,
        target,
        admin,
        checkout_at,
        expected_checkin: request.expected_checkin,
        note: request.note,
    });
    if state.events.send(event).is_err() {
        warn!("Notification listener is gone, checkout event dropped");
    }

    Ok(Json(ApiEnvelope::success(
        responses,
        "Assets checked out successfully",
    )))
}

/// Check an asset back in
#[utoipa::path(
    post,
    path = "/api/v1/assets/{asset_id}/checkin",
    tag = "assets",
    params(
        ("asset_id" = i32, Path, description = "Asset ID"),
    ),
    responses(
        (status = 200, description = "Asset checked in, or asset was not checked out", body = ApiEnvelope<AssetResponse>),
        (status = 404, description = "Asset not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn checkin_asset(
    Path(asset_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<AssetResponse>>, StatusCode> {
    trace!("Entering checkin_asset function for asset_id: {}", asset_id);

    let existing = match asset::Entity::find_by_id(asset_id).one(&state.db).await {
        Ok(Some(asset)) if !asset.is_deleted() => asset,
        Ok(_) => {
            warn!("Asset with ID {} not found for checkin", asset_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to lookup asset with ID {}: {}", asset_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let Some(previous_holder) = existing.assigned_to else {
        debug!("Asset {} is not checked out", asset_id);
        return Ok(Json(ApiEnvelope::error("Asset is not checked out")));
    };

    let mut asset_active: asset::ActiveModel = existing.into();
    asset_active.assigned_to = Set(None);
    asset_active.updated_at = Set(Utc::now().naive_utc());

    match asset_active.update(&state.db).await {
        Ok(updated) => {
            info!("Asset {} checked in from user {}", asset_id, previous_holder);
            let log = AuditEntry::new(ActionType::Checkin, ITEM_ASSET, asset_id)
                .target(TARGET_USER, previous_holder);
            if let Err(db_error) = audit::record(&state.db, log).await {
                warn!("Failed to write checkin audit entry: {}", db_error);
            }
            Ok(Json(ApiEnvelope::success(
                AssetResponse::from(updated),
                "Asset checked in successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to check in asset {}: {}", asset_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
