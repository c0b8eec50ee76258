//! Append-only audit trail writers.
//!
//! Every checkout, checkin, and record mutation appends one row to
//! `action_logs`. Target ids are written verbatim, even when the target row
//! is soft-deleted or already purged, so history stays attributable.

use model::entities::action_log::{self, ActionType};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};
use tracing::debug;

pub const ITEM_ASSET: &str = "Asset";
pub const ITEM_LICENSE: &str = "License";

pub const TARGET_USER: &str = "User";
pub const TARGET_ASSET: &str = "Asset";
pub const TARGET_LOCATION: &str = "Location";

/// One audit trail entry to append.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub action: ActionType,
    pub item_type: &'static str,
    pub item_id: i32,
    pub target: Option<(&'static str, i32)>,
    pub note: Option<String>,
    pub created_by: Option<i32>,
}

impl AuditEntry {
    pub fn new(action: ActionType, item_type: &'static str, item_id: i32) -> Self {
        Self {
            action,
            item_type,
            item_id,
            target: None,
            note: None,
            created_by: None,
        }
    }

    pub fn target(mut self, target_type: &'static str, target_id: i32) -> Self {
        self.target = Some((target_type, target_id));
        self
    }

    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    pub fn created_by(mut self, created_by: Option<i32>) -> Self {
        self.created_by = created_by;
        self
    }
}

/// Append an entry to the action log.
pub async fn record(db: &DatabaseConnection, entry: AuditEntry) -> Result<(), DbErr> {
    debug!(
        "Recording action log entry: {:?} {} {}",
        entry.action, entry.item_type, entry.item_id
    );

    let (target_type, target_id) = match entry.target {
        Some((ty, id)) => (Some(ty.to_string()), Some(id)),
        None => (None, None),
    };

    action_log::ActiveModel {
        action_type: Set(entry.action),
        item_type: Set(entry.item_type.to_string()),
        item_id: Set(entry.item_id),
        target_type: Set(target_type),
        target_id: Set(target_id),
        note: Set(entry.note),
        created_by: Set(entry.created_by),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(())
}
