use crate::schemas::{ApiEnvelope, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::category;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a category
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    /// Checkouts of items in this category require EULA acceptance
    pub require_acceptance: Option<bool>,
    pub eula_text: Option<String>,
    /// Use the site-wide default EULA instead of `eula_text`
    pub use_default_eula: Option<bool>,
    pub checkin_email: Option<bool>,
}

/// Request body for updating a category
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub require_acceptance: Option<bool>,
    pub eula_text: Option<String>,
    pub use_default_eula: Option<bool>,
    pub checkin_email: Option<bool>,
}

/// Category response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub require_acceptance: bool,
    pub eula_text: Option<String>,
    pub use_default_eula: bool,
    pub checkin_email: bool,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            require_acceptance: model.require_acceptance,
            eula_text: model.eula_text,
            use_default_eula: model.use_default_eula,
            checkin_email: model.checkin_email,
        }
    }
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created successfully", body = ApiEnvelope<CategoryResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<CategoryResponse>>), StatusCode> {
    trace!("Entering create_category function");
    debug!("Creating category with name: {}", request.name);

    let new_category = category::ActiveModel {
        name: Set(request.name.clone()),
        require_acceptance: Set(request.require_acceptance.unwrap_or(false)),
        eula_text: Set(request.eula_text.clone()),
        use_default_eula: Set(request.use_default_eula.unwrap_or(false)),
        checkin_email: Set(request.checkin_email.unwrap_or(false)),
        ..Default::default()
    };

    match new_category.insert(&state.db).await {
        Ok(category_model) => {
            info!(
                "Category created successfully with ID: {}",
                category_model.id
            );
            Ok((
                StatusCode::CREATED,
                Json(ApiEnvelope::success(
                    CategoryResponse::from(category_model),
                    "Category created successfully",
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to create category '{}': {}", request.name, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiEnvelope<Vec<CategoryResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<CategoryResponse>>>, StatusCode> {
    trace!("Entering get_categories function");

    match category::Entity::find().all(&state.db).await {
        Ok(categories) => {
            debug!("Retrieved {} categories from database", categories.len());
            let responses: Vec<CategoryResponse> = categories
                .into_iter()
                .map(CategoryResponse::from)
                .collect();
            Ok(Json(ApiEnvelope::success(
                responses,
                "Categories retrieved successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to retrieve categories: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific category by ID
#[utoipa::path(
    get,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    responses(
        (status = 200, description = "Category retrieved successfully", body = ApiEnvelope<CategoryResponse>),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn get_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<CategoryResponse>>, StatusCode> {
    trace!("Entering get_category function for category_id: {}", category_id);

    match category::Entity::find_by_id(category_id).one(&state.db).await {
        Ok(Some(category_model)) => Ok(Json(ApiEnvelope::success(
            CategoryResponse::from(category_model),
            "Category retrieved successfully",
        ))),
        Ok(None) => {
            warn!("Category with ID {} not found", category_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve category with ID {}: {}",
                category_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated successfully", body = ApiEnvelope<CategoryResponse>),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn update_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiEnvelope<CategoryResponse>>, StatusCode> {
    trace!("Entering update_category function for category_id: {}", category_id);

    let existing = match category::Entity::find_by_id(category_id).one(&state.db).await {
        Ok(Some(category)) => category,
        Ok(None) => {
            warn!("Category with ID {} not found for update", category_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup category with ID {}: {}",
                category_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut category_active: category::ActiveModel = existing.into();

    if let Some(name) = request.name {
        category_active.name = Set(name);
    }
    if let Some(require_acceptance) = request.require_acceptance {
        category_active.require_acceptance = Set(require_acceptance);
    }
    if let Some(eula_text) = request.eula_text {
        category_active.eula_text = Set(Some(eula_text));
    }
    if let Some(use_default_eula) = request.use_default_eula {
        category_active.use_default_eula = Set(use_default_eula);
    }
    if let Some(checkin_email) = request.checkin_email {
        category_active.checkin_email = Set(checkin_email);
    }

    match category_active.update(&state.db).await {
        Ok(updated) => {
            info!("Category with ID {} updated successfully", category_id);
            Ok(Json(ApiEnvelope::success(
                CategoryResponse::from(updated),
                "Category updated successfully",
            )))
        }
        Err(db_error) => {
            error!(
                "Failed to update category with ID {}: {}",
                category_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    responses(
        (status = 200, description = "Category deleted successfully", body = ApiEnvelope<String>),
        (status = 200, description = "Category still has items", body = ApiEnvelope<serde_json::Value>),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument]
pub async fn delete_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<String>>, StatusCode> {
    trace!("Entering delete_category function for category_id: {}", category_id);

    match category::Entity::delete_by_id(category_id).exec(&state.db).await {
        Ok(delete_result) if delete_result.rows_affected > 0 => {
            info!("Category with ID {} deleted", category_id);
            Ok(Json(ApiEnvelope::success(
                format!("Category {category_id} deleted"),
                "Category deleted successfully",
            )))
        }
        Ok(_) => {
            warn!("Category with ID {} not found for deletion", category_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            // Assets reference categories with ON DELETE RESTRICT, so a
            // populated category surfaces here as a foreign key error.
            warn!(
                "Failed to delete category with ID {}: {}",
                category_id, db_error
            );
            Ok(Json(ApiEnvelope::error(
                "Category cannot be deleted while items are assigned to it",
            )))
        }
    }
}
