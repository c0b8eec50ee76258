use anyhow::Result;
use moka::future::Cache;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, EntityTrait, Set};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::notifications::listener::{self, NotificationListener};
use crate::notifications::mailer::TracingMailer;
use crate::schemas::{AppState, CachedData};
use model::entities::setting;

/// Cache key for the settings row.
pub const SETTINGS_CACHE_KEY: &str = "settings";

/// Cache key for one license's seat counts.
pub fn utilization_cache_key(license_id: i32) -> String {
    format!("utilization_{license_id}")
}

/// Initialize application state: database connection, cache, and the
/// notification listener fed by the event channel.
pub async fn initialize_app_state(database_url: &str) -> Result<AppState> {
    dotenvy::dotenv().ok();

    // Connect to database
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    // Initialize cache
    let cache: Cache<String, CachedData> = Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes
        .build();

    // Wire the notification listener to the event channel
    let (tx, rx) = mpsc::unbounded_channel();
    let notification_listener =
        NotificationListener::new(db.clone(), cache.clone(), Arc::new(TracingMailer));
    listener::spawn(rx, notification_listener);

    Ok(AppState {
        db,
        cache,
        events: tx,
    })
}

/// Get bind address from environment or use default
pub fn get_bind_address() -> String {
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

/// The settings row, from cache when fresh. The row is created with defaults
/// on first access; updates through the settings handler invalidate the
/// cache entry.
pub async fn cached_settings(
    db: &DatabaseConnection,
    cache: &Cache<String, CachedData>,
) -> Result<setting::Model, DbErr> {
    if let Some(CachedData::Settings(settings)) = cache.get(SETTINGS_CACHE_KEY).await {
        return Ok(settings);
    }

    let settings = match setting::Entity::find().one(db).await? {
        Some(settings) => settings,
        None => {
            tracing::debug!("No settings row yet, creating defaults");
            setting::ActiveModel {
                site_name: Set("assetrust".to_string()),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    cache
        .insert(
            SETTINGS_CACHE_KEY.to_string(),
            CachedData::Settings(settings.clone()),
        )
        .await;

    Ok(settings)
}
