use crate::schemas::{ApiEnvelope, AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDateTime;
use model::entities::action_log::{self, ActionType};
use sea_orm::{EntityTrait, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, trace};
use utoipa::ToSchema;

/// One row of the activity report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityEntry {
    pub id: i32,
    pub action_type: String,
    pub item_type: String,
    pub item_id: i32,
    pub target_type: Option<String>,
    pub target_id: Option<i32>,
    pub note: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

impl From<action_log::Model> for ActivityEntry {
    fn from(model: action_log::Model) -> Self {
        Self {
            id: model.id,
            action_type: action_type_label(model.action_type).to_string(),
            item_type: model.item_type,
            item_id: model.item_id,
            target_type: model.target_type,
            target_id: model.target_id,
            note: model.note,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

fn action_type_label(action_type: ActionType) -> &'static str {
    match action_type {
        ActionType::Create => "create",
        ActionType::Update => "update",
        ActionType::Delete => "delete",
        ActionType::Checkout => "checkout",
        ActionType::Checkin => "checkin",
        ActionType::AddSeats => "add seats",
    }
}

/// Query parameters for the activity report
#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

const DEFAULT_ACTIVITY_PAGE_SIZE: u64 = 50;

/// Activity report: the action log, newest first
#[utoipa::path(
    get,
    path = "/api/v1/reports/activity",
    tag = "reports",
    params(
        ("offset" = Option<u64>, Query, description = "Pagination offset"),
        ("limit" = Option<u64>, Query, description = "Page size (default 50)"),
    ),
    responses(
        (status = 200, description = "Activity retrieved successfully", body = ApiEnvelope<Vec<ActivityEntry>>),
        (status = 500, description = "Internal server error")
    )
)]
#[instrument(skip(state))]
pub async fn get_activity_report(
    Query(query): Query<ActivityQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<ActivityEntry>>>, StatusCode> {
    trace!("Entering get_activity_report function");

    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_PAGE_SIZE);

    match action_log::Entity::find()
        .order_by_desc(action_log::Column::CreatedAt)
        .order_by_desc(action_log::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(&state.db)
        .await
    {
        Ok(entries) => {
            debug!("Retrieved {} activity entries", entries.len());
            let entries: Vec<ActivityEntry> =
                entries.into_iter().map(ActivityEntry::from).collect();
            Ok(Json(ApiEnvelope::success(
                entries,
                "Activity retrieved successfully",
            )))
        }
        Err(db_error) => {
            error!("Failed to retrieve activity report: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
