use crate::schemas::{ApiEnvelope, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use model::entities::{license, license_seat, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a new user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Username (must be unique)
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Notification address
    #[validate(email(message = "The email field must be a valid email address."))]
    pub email: Option<String>,
    pub activated: Option<bool>,
}

/// Request body for updating a user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "The email field must be a valid email address."))]
    pub email: Option<String>,
    pub activated: Option<bool>,
}

/// User response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub activated: bool,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            activated: model.activated,
        }
    }
}

/// License summary for the per-user listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignedLicenseResponse {
    pub id: i32,
    pub name: String,
    pub product_key: Option<String>,
    pub seat_id: i32,
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiEnvelope<UserResponse>),
        (status = 200, description = "Validation failed", body = ApiEnvelope<serde_json::Value>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<UserResponse>>), StatusCode> {
    trace!("Entering create_user function");
    debug!("Creating user with username: {}", request.username);

    if let Err(errors) = request.validate() {
        warn!("User validation failed: {}", errors);
        return Ok((StatusCode::OK, Json(ApiEnvelope::from_validation(&errors))));
    }

    let new_user = user::ActiveModel {
        username: Set(request.username.clone()),
        first_name: Set(request.first_name.clone()),
        last_name: Set(request.last_name.clone()),
        email: Set(request.email.clone()),
        activated: Set(request.activated.unwrap_or(true)),
        ..Default::default()
    };

    match new_user.insert(&state.db).await {
        Ok(user_model) => {
            info!(
                "User created successfully with ID: {}, username: {}",
                user_model.id, user_model.username
            );
            let response = ApiEnvelope::success(
                UserResponse::from(user_model),
                "User created successfully",
            );
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create user '{}': {}", request.username, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all users (excluding soft-deleted ones)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiEnvelope<Vec<UserResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_users(
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<UserResponse>>>, StatusCode> {
    trace!("Entering get_users function");

    match user::Entity::find()
        .filter(user::Column::DeletedAt.is_null())
        .all(&state.db)
        .await
    {
        Ok(users) => {
            debug!("Retrieved {} users from database", users.len());
            let responses: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
            Ok(Json(ApiEnvelope::success(
                responses,
                "Users retrieved successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to retrieve users: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiEnvelope<UserResponse>),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<UserResponse>>, StatusCode> {
    trace!("Entering get_user function for user_id: {}", user_id);

    match user::Entity::find_by_id(user_id).one(&state.db).await {
        Ok(Some(user_model)) if !user_model.is_deleted() => {
            info!("Successfully retrieved user with ID: {}", user_model.id);
            Ok(Json(ApiEnvelope::success(
                UserResponse::from(user_model),
                "User retrieved successfully",
            )))
        }
        Ok(_) => {
            warn!("User with ID {} not found", user_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve user with ID {}: {}", user_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiEnvelope<UserResponse>),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiEnvelope<UserResponse>>, StatusCode> {
    trace!("Entering update_user function for user_id: {}", user_id);

    if let Err(errors) = request.validate() {
        warn!("User validation failed: {}", errors);
        return Ok(Json(ApiEnvelope::from_validation(&errors)));
    }

    let existing_user = match user::Entity::find_by_id(user_id).one(&state.db).await {
        Ok(Some(user)) if !user.is_deleted() => user,
        Ok(_) => {
            warn!("User with ID {} not found for update", user_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to lookup user with ID {}: {}", user_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut user_active: user::ActiveModel = existing_user.into();

    if let Some(username) = request.username {
        user_active.username = Set(username);
    }
    if let Some(first_name) = request.first_name {
        user_active.first_name = Set(Some(first_name));
    }
    if let Some(last_name) = request.last_name {
        user_active.last_name = Set(Some(last_name));
    }
    if let Some(email) = request.email {
        user_active.email = Set(Some(email));
    }
    if let Some(activated) = request.activated {
        user_active.activated = Set(activated);
    }

    match user_active.update(&state.db).await {
        Ok(updated_user) => {
            info!("User with ID {} updated successfully", user_id);
            Ok(Json(ApiEnvelope::success(
                UserResponse::from(updated_user),
                "User updated successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to update user with ID {}: {}", user_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Soft-delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiEnvelope<String>),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<String>>, StatusCode> {
    trace!("Entering delete_user function for user_id: {}", user_id);

    let existing_user = match user::Entity::find_by_id(user_id).one(&state.db).await {
        Ok(Some(user)) if !user.is_deleted() => user,
        Ok(_) => {
            warn!("User with ID {} not found for deletion", user_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to lookup user with ID {}: {}", user_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Soft delete keeps the row so seat history stays attributable.
    let mut user_active: user::ActiveModel = existing_user.into();
    user_active.deleted_at = Set(Some(Utc::now().naive_utc()));

    match user_active.update(&state.db).await {
        Ok(_) => {
            info!("User with ID {} soft-deleted", user_id);
            Ok(Json(ApiEnvelope::success(
                format!("User {user_id} deleted"),
                "User deleted successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to delete user with ID {}: {}", user_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Licenses currently seated to a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/licenses",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Licenses retrieved successfully", body = ApiEnvelope<Vec<AssignedLicenseResponse>>),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_user_licenses(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<AssignedLicenseResponse>>>, StatusCode> {
    trace!("Entering get_user_licenses for user_id: {}", user_id);

    match user::Entity::find_by_id(user_id).one(&state.db).await {
        Ok(Some(user)) if !user.is_deleted() => user,
        Ok(_) => {
            warn!("User with ID {} not found", user_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to lookup user with ID {}: {}", user_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let seats = match license_seat::Entity::find()
        .filter(license_seat::Column::AssignedTo.eq(user_id))
        .filter(license_seat::Column::DeletedAt.is_null())
        .find_also_related(license::Entity)
        .all(&state.db)
        .await
    {
        Ok(seats) => seats,
        Err(db_error) => {
            error!(
                "Failed to retrieve licenses for user {}: {}",
                user_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let licenses: Vec<AssignedLicenseResponse> = seats
        .into_iter()
        .filter_map(|(seat, license)| {
            license.map(|license| AssignedLicenseResponse {
                id: license.id,
                name: license.name,
                product_key: license.product_key,
                seat_id: seat.id,
            })
        })
        .collect();

    debug!("User {} holds {} license seats", user_id, licenses.len());
    Ok(Json(ApiEnvelope::success(
        licenses,
        "Licenses retrieved successfully",
    )))
}
