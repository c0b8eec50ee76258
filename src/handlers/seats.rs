use crate::audit::{self, AuditEntry, ITEM_LICENSE, TARGET_ASSET, TARGET_USER};
use crate::config::utilization_cache_key;
use crate::schemas::{ApiEnvelope, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use model::entities::{action_log::ActionType, asset, license, license_seat, user};
use model::seat::{
    plan_seat_update, Patch, SeatHolder, SeatPatch, SeatTransition, SeatUpdateViolation,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// License seat response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SeatResponse {
    pub id: i32,
    pub license_id: i32,
    pub assigned_to: Option<i32>,
    pub asset_id: Option<i32>,
    pub notes: Option<String>,
    pub unreassignable_seat: bool,
    pub created_by: Option<i32>,
}

impl From<license_seat::Model> for SeatResponse {
    fn from(model: license_seat::Model) -> Self {
        Self {
            id: model.id,
            license_id: model.license_id,
            assigned_to: model.assigned_to,
            asset_id: model.asset_id,
            notes: model.notes,
            unreassignable_seat: model.unreassignable_seat,
            created_by: model.created_by,
        }
    }
}

/// Seat listing with the unpaginated total
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SeatListResponse {
    pub total: u64,
    pub rows: Vec<SeatResponse>,
}

/// Query parameters for the seat listing
#[derive(Debug, Deserialize)]
pub struct SeatListQuery {
    /// `available` or `assigned`
    pub status: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    /// `asc` or `desc` by updated_at (default desc)
    pub order: Option<String>,
}

const DEFAULT_SEAT_PAGE_SIZE: u64 = 50;

/// List the seats of a license
#[utoipa::path(
    get,
    path = "/api/v1/licenses/{license_id}/seats",
    tag = "seats",
    params(
        ("license_id" = i32, Path, description = "License ID"),
        ("status" = Option<String>, Query, description = "Filter: available or assigned"),
        ("offset" = Option<u64>, Query, description = "Pagination offset"),
        ("limit" = Option<u64>, Query, description = "Page size (default 50)"),
        ("order" = Option<String>, Query, description = "Sort by updated_at: asc or desc"),
    ),
    responses(
        (status = 200, description = "Seats retrieved successfully", body = ApiEnvelope<SeatListResponse>),
        (status = 404, description = "License not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip(state))]
pub async fn get_seats(
    Path(license_id): Path<i32>,
    Query(query): Query<SeatListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<SeatListResponse>>, StatusCode> {
    trace!("Entering get_seats function for license_id: {}", license_id);

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

    let mut seats = license_seat::Entity::find()
        .filter(license_seat::Column::LicenseId.eq(license_id))
        .filter(license_seat::Column::DeletedAt.is_null());

    match query.status.as_deref() {
        None => {}
        Some("available") => {
            seats = seats
                .filter(license_seat::Column::AssignedTo.is_null())
                .filter(license_seat::Column::AssetId.is_null());
        }
        Some("assigned") => {
            seats = seats.filter(
                Condition::any()
                    .add(license_seat::Column::AssignedTo.is_not_null())
                    .add(license_seat::Column::AssetId.is_not_null()),
            );
        }
        Some(other) => {
            warn!("Unknown seat status filter: {}", other);
            let mut errors = BTreeMap::new();
            errors.insert(
                "status".to_string(),
                vec!["The status field must be one of: available, assigned.".to_string()],
            );
            return Ok(Json(ApiEnvelope::field_errors(errors)));
        }
    }

    let total = match seats.clone().count(&state.db).await {
        Ok(total) => total,
        Err(db_error) => {
            error!(
                "Failed to count seats for license {}: {}",
                license_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // An offset past the end falls back to the first page.
    let mut offset = query.offset.unwrap_or(0);
    if offset >= total {
        offset = 0;
    }
    let limit = query.limit.unwrap_or(DEFAULT_SEAT_PAGE_SIZE);

    let seats = match query.order.as_deref() {
        Some("asc") => seats.order_by_asc(license_seat::Column::UpdatedAt),
        _ => seats.order_by_desc(license_seat::Column::UpdatedAt),
    };

    match seats.offset(offset).limit(limit).all(&state.db).await {
        Ok(rows) => {
            debug!(
                "Retrieved {} of {} seats for license {}",
                rows.len(),
                total,
                license_id
            );
            let rows: Vec<SeatResponse> = rows.into_iter().map(SeatResponse::from).collect();
            Ok(Json(ApiEnvelope::success(
                SeatListResponse { total, rows },
                "Seats retrieved successfully",
            )))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve seats for license {}: {}",
                license_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a single seat of a license
#[utoipa::path(
    get,
    path = "/api/v1/licenses/{license_id}/seats/{seat_id}",
    tag = "seats",
    params(
        ("license_id" = i32, Path, description = "License ID"),
        ("seat_id" = i32, Path, description = "Seat ID"),
    ),
    responses(
        (status = 200, description = "Seat retrieved, or seat belongs to another license", body = ApiEnvelope<SeatResponse>),
        (status = 404, description = "License or seat not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_seat(
    Path((license_id, seat_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<SeatResponse>>, StatusCode> {
    trace!(
        "Entering get_seat function for license_id: {}, seat_id: {}",
        license_id,
        seat_id
    );

    let seat = match fetch_license_seat(&state, license_id, seat_id).await? {
        Ok(seat) => seat,
        Err(envelope) => return Ok(Json(envelope)),
    };

    Ok(Json(ApiEnvelope::success(
        SeatResponse::from(seat),
        "Seat retrieved successfully",
    )))
}

/// Fetch a license and one of its seats, distinguishing a missing row (404)
/// from a seat that exists under a different license (error envelope).
async fn fetch_license_seat<T>(
    state: &AppState,
    license_id: i32,
    seat_id: i32,
) -> Result<Result<license_seat::Model, ApiEnvelope<T>>, StatusCode> {
    match license::Entity::find_by_id(license_id).one(&state.db).await {
        Ok(Some(license)) if !license.is_deleted() => {}
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
    }

    match license_seat::Entity::find_by_id(seat_id).one(&state.db).await {
        Ok(Some(seat)) if seat.deleted_at.is_none() => {
            if seat.license_id != license_id {
                warn!(
                    "Seat {} belongs to license {}, not {}",
                    seat_id, seat.license_id, license_id
                );
                return Ok(Err(ApiEnvelope::error(
                    "Seat does not belong to the specified license",
                )));
            }
            Ok(Ok(seat))
        }
        Ok(_) => {
            warn!("Seat with ID {} not found", seat_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to lookup seat with ID {}: {}", seat_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn push_error(errors: &mut BTreeMap<String, Vec<String>>, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.into());
}

/// Parse one tri-state id field out of the raw body.
fn parse_id_field(
    body: &serde_json::Value,
    field: &str,
    errors: &mut BTreeMap<String, Vec<String>>,
) -> Patch<i32> {
    match body.get(field) {
        None => Patch::Missing,
        Some(serde_json::Value::Null) => Patch::Null,
        Some(serde_json::Value::Number(number)) => match number.as_i64() {
            Some(id) if i32::try_from(id).is_ok() => Patch::Value(id as i32),
            _ => {
                push_error(errors, field, format!("The {field} field must be an integer or null."));
                Patch::Missing
            }
        },
        Some(_) => {
            push_error(errors, field, format!("The {field} field must be an integer or null."));
            Patch::Missing
        }
    }
}

fn parse_notes_field(
    body: &serde_json::Value,
    errors: &mut BTreeMap<String, Vec<String>>,
) -> Patch<String> {
    match body.get("notes") {
        None => Patch::Missing,
        Some(serde_json::Value::Null) => Patch::Null,
        Some(serde_json::Value::String(notes)) => Patch::Value(notes.clone()),
        Some(_) => {
            push_error(errors, "notes", "The notes field must be a string or null.");
            Patch::Missing
        }
    }
}

/// Update a license seat: checkout, checkin, or a notes edit.
///
/// The body is parsed by hand so absent fields, explicit nulls, and wrong
/// JSON types can be told apart; wrong types come back as the standard
/// field-error envelope rather than a 422. Fields other than `assigned_to`,
/// `asset_id`, and `notes` are ignored.
#[utoipa::path(
    patch,
    path = "/api/v1/licenses/{license_id}/seats/{seat_id}",
    tag = "seats",
    params(
        ("license_id" = i32, Path, description = "License ID"),
        ("seat_id" = i32, Path, description = "Seat ID"),
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Seat updated, or the update was rejected", body = ApiEnvelope<SeatResponse>),
        (status = 404, description = "License or seat not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip(state, body))]
pub async fn update_seat(
    Path((license_id, seat_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ApiEnvelope<SeatResponse>>, StatusCode> {
    trace!(
        "Entering update_seat function for license_id: {}, seat_id: {}",
        license_id,
        seat_id
    );

    let license = match license::Entity::find_by_id(license_id).one(&state.db).await {
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

    let seat = match license_seat::Entity::find_by_id(seat_id).one(&state.db).await {
        Ok(Some(seat)) if seat.deleted_at.is_none() => {
            if seat.license_id != license_id {
                warn!(
                    "Seat {} belongs to license {}, not {}",
                    seat_id, seat.license_id, license_id
                );
                return Ok(Json(ApiEnvelope::error(
                    "Seat does not belong to the specified license",
                )));
            }
            seat
        }
        Ok(_) => {
            warn!("Seat with ID {} not found", seat_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to lookup seat with ID {}: {}", seat_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut field_errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let patch = SeatPatch {
        assigned_to: parse_id_field(&body, "assigned_to", &mut field_errors),
        asset_id: parse_id_field(&body, "asset_id", &mut field_errors),
        notes: parse_notes_field(&body, &mut field_errors),
    };

    // Referenced rows must exist and be live.
    if let Patch::Value(user_id) = patch.assigned_to {
        match user::Entity::find_by_id(user_id).one(&state.db).await {
            Ok(Some(user)) if !user.is_deleted() => {}
            Ok(_) => {
                push_error(
                    &mut field_errors,
                    "assigned_to",
                    "The selected assigned_to is invalid.",
                );
            }
            Err(db_error) => {
                error!("Failed to lookup user with ID {}: {}", user_id, db_error);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }
    if let Patch::Value(asset_id) = patch.asset_id {
        match asset::Entity::find_by_id(asset_id).one(&state.db).await {
            Ok(Some(asset)) if !asset.is_deleted() => {}
            Ok(_) => {
                push_error(
                    &mut field_errors,
                    "asset_id",
                    "The selected asset_id is invalid.",
                );
            }
            Err(db_error) => {
                error!("Failed to lookup asset with ID {}: {}", asset_id, db_error);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }

    if !field_errors.is_empty() {
        warn!("Seat update validation failed: {:?}", field_errors);
        return Ok(Json(ApiEnvelope::field_errors(field_errors)));
    }

    match plan_seat_update(&seat, &patch) {
        SeatTransition::Unchanged => {
            debug!("Seat {} update changes nothing", seat_id);
            Ok(Json(ApiEnvelope::success(
                SeatResponse::from(seat),
                "Seat updated successfully",
            )))
        }
        SeatTransition::NotesOnly => {
            let new_notes = patch.notes.apply(seat.notes.clone());
            let mut seat_active: license_seat::ActiveModel = seat.into();
            seat_active.notes = Set(new_notes);
            seat_active.updated_at = Set(Utc::now().naive_utc());
            match seat_active.update(&state.db).await {
                Ok(updated) => {
                    info!("Seat {} notes updated", seat_id);
                    Ok(Json(ApiEnvelope::success(
                        SeatResponse::from(updated),
                        "Seat updated successfully",
                    )))
                }
                Err(db_error) => {
                    error!("Failed to update seat {}: {}", seat_id, db_error);
                    Err(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }
        SeatTransition::Rejected(SeatUpdateViolation::UnreassignableSeat) => {
            debug!("Seat {} is not reassignable", seat_id);
            Ok(Json(ApiEnvelope::error(
                "This seat is not available for checkout",
            )))
        }
        SeatTransition::Rejected(SeatUpdateViolation::BothTargets) => {
            debug!("Seat {} update would assign a user and an asset", seat_id);
            let mut errors = BTreeMap::new();
            push_error(
                &mut errors,
                "assigned_to",
                "The assigned_to field prohibits asset_id from being present.",
            );
            push_error(
                &mut errors,
                "asset_id",
                "The asset_id field prohibits assigned_to from being present.",
            );
            Ok(Json(ApiEnvelope::field_errors(errors)))
        }
        SeatTransition::Checkout { to } => {
            checkout_seat(&state, license_id, seat, &patch, to).await
        }
        SeatTransition::Checkin { previous } => {
            checkin_seat(&state, &license, seat, &patch, previous).await
        }
    }
}

async fn checkout_seat(
    state: &AppState,
    license_id: i32,
    seat: license_seat::Model,
    patch: &SeatPatch,
    to: SeatHolder,
) -> Result<Json<ApiEnvelope<SeatResponse>>, StatusCode> {
    // Re-resolve the holder at save time. Validation passed already, but the
    // row can vanish in between.
    let resolved = match to {
        SeatHolder::User(user_id) => {
            match user::Entity::find_by_id(user_id).one(&state.db).await {
                Ok(Some(user)) if !user.is_deleted() => true,
                Ok(_) => false,
                Err(db_error) => {
                    error!("Failed to resolve user {}: {}", user_id, db_error);
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        }
        SeatHolder::Asset(asset_id) => {
            match asset::Entity::find_by_id(asset_id).one(&state.db).await {
                Ok(Some(asset)) if !asset.is_deleted() => true,
                Ok(_) => false,
                Err(db_error) => {
                    error!("Failed to resolve asset {}: {}", asset_id, db_error);
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        }
    };
    if !resolved {
        warn!("Checkout target vanished for seat {}", seat.id);
        return Ok(Json(ApiEnvelope::error("Target not found")));
    }

    let seat_id = seat.id;
    let new_notes = patch.notes.apply(seat.notes.clone());
    let mut seat_active: license_seat::ActiveModel = seat.into();
    match to {
        SeatHolder::User(user_id) => {
            seat_active.assigned_to = Set(Some(user_id));
            seat_active.asset_id = Set(None);
        }
        SeatHolder::Asset(asset_id) => {
            seat_active.asset_id = Set(Some(asset_id));
            seat_active.assigned_to = Set(None);
        }
    }
    seat_active.notes = Set(new_notes);
    seat_active.updated_at = Set(Utc::now().naive_utc());

    let updated = match seat_active.update(&state.db).await {
        Ok(updated) => updated,
        Err(db_error) => {
            error!("Failed to check out seat {}: {}", seat_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let log_target = match to {
        SeatHolder::User(user_id) => (TARGET_USER, user_id),
        SeatHolder::Asset(asset_id) => (TARGET_ASSET, asset_id),
    };
    let log = AuditEntry::new(ActionType::Checkout, ITEM_LICENSE, license_id)
        .target(log_target.0, log_target.1)
        .note(updated.notes.clone());
    if let Err(db_error) = audit::record(&state.db, log).await {
        warn!("Failed to write seat checkout audit entry: {}", db_error);
    }

    state
        .cache
        .invalidate(&utilization_cache_key(license_id))
        .await;
    info!("Seat {} checked out ({:?})", seat_id, to);

    Ok(Json(ApiEnvelope::success(
        SeatResponse::from(updated),
        "Seat updated successfully",
    )))
}

async fn checkin_seat(
    state: &AppState,
    license: &license::Model,
    seat: license_seat::Model,
    patch: &SeatPatch,
    previous: Option<SeatHolder>,
) -> Result<Json<ApiEnvelope<SeatResponse>>, StatusCode> {
    let seat_id = seat.id;
    let new_notes = patch.notes.apply(seat.notes.clone());
    let mut seat_active: license_seat::ActiveModel = seat.into();
    seat_active.assigned_to = Set(None);
    seat_active.asset_id = Set(None);
    seat_active.notes = Set(new_notes);
    seat_active.updated_at = Set(Utc::now().naive_utc());

    let mut updated = match seat_active.update(&state.db).await {
        Ok(updated) => updated,
        Err(db_error) => {
            error!("Failed to check in seat {}: {}", seat_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Checking in under a non-reassignable license burns the seat for good.
    if !license.reassignable {
        debug!(
            "License {} is not reassignable, burning seat {}",
            license.id, seat_id
        );
        let mut seat_active: license_seat::ActiveModel = updated.into();
        seat_active.unreassignable_seat = Set(true);
        updated = match seat_active.update(&state.db).await {
            Ok(updated) => updated,
            Err(db_error) => {
                error!("Failed to flag seat {} unreassignable: {}", seat_id, db_error);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };
    }

    // The prior holder may be soft-deleted or purged; its id still lands in
    // the log.
    let mut log = AuditEntry::new(ActionType::Checkin, ITEM_LICENSE, license.id)
        .note(updated.notes.clone());
    if let Some(previous) = previous {
        log = match previous {
            SeatHolder::User(user_id) => log.target(TARGET_USER, user_id),
            SeatHolder::Asset(asset_id) => log.target(TARGET_ASSET, asset_id),
        };
    }
    if let Err(db_error) = audit::record(&state.db, log).await {
        warn!("Failed to write seat checkin audit entry: {}", db_error);
    }

    state
        .cache
        .invalidate(&utilization_cache_key(license.id))
        .await;
    info!("Seat {} checked in", seat_id);

    Ok(Json(ApiEnvelope::success(
        SeatResponse::from(updated),
        "Seat updated successfully",
    )))
}
