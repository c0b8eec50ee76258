//! Background consumer of application events.
//!
//! One listener task runs for the lifetime of the process, draining the
//! event channel. For each bulk checkout it loads the settings row, decides
//! the recipient set, and hands rendered mail to the [`Mailer`]. A configured
//! webhook endpoint additionally receives a one-line summary.

use std::sync::Arc;

use moka::future::Cache;
use sea_orm::DatabaseConnection;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::cached_settings;
use crate::schemas::CachedData;

use super::events::{AppEvent, BulkCheckedOut};
use super::mail;
use super::mailer::{Mailer, OutboundMail};
use super::webhook::WebhookSink;
use super::NotifyError;

pub struct NotificationListener {
    db: DatabaseConnection,
    cache: Cache<String, CachedData>,
    mailer: Arc<dyn Mailer>,
    webhook: WebhookSink,
}

/// Spawn the listener task draining `rx`.
pub fn spawn(
    rx: mpsc::UnboundedReceiver<AppEvent>,
    listener: NotificationListener,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rx = rx;
        while let Some(event) = rx.recv().await {
            if let Err(e) = listener.handle(event).await {
                error!("Notification dispatch failed: {}", e);
            }
        }
        debug!("Event channel closed, notification listener stopping");
    })
}

impl NotificationListener {
    pub fn new(
        db: DatabaseConnection,
        cache: Cache<String, CachedData>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            db,
            cache,
            mailer,
            webhook: WebhookSink::new(),
        }
    }

    pub async fn handle(&self, event: AppEvent) -> Result<(), NotifyError> {
        match event {
            AppEvent::BulkCheckedOut(event) => self.handle_bulk_checkout(event).await,
        }
    }

    #[instrument(skip(self, event))]
    async fn handle_bulk_checkout(&self, event: BulkCheckedOut) -> Result<(), NotifyError> {
        let settings = cached_settings(&self.db, &self.cache).await?;
        let rendered = mail::build(&event, &settings);

        let mut recipients: Vec<String> = Vec::new();

        // The target only gets mail when something in the batch needs their
        // acceptance.
        if rendered.requires_acceptance {
            match event.target.email() {
                Some(email) => recipients.push(email.to_string()),
                None => debug!("Checkout target has no email address, skipping"),
            }
        }

        // The admin CC address is copied on acceptance mail, or on every
        // checkout when admin_cc_always is set.
        if let Some(cc) = settings.admin_cc_email.as_deref().filter(|s| !s.is_empty()) {
            if rendered.requires_acceptance || settings.admin_cc_always {
                recipients.push(cc.to_string());
            }
        }

        if recipients.is_empty() {
            debug!("No recipients for bulk checkout notification");
        }

        for to in recipients {
            info!("Sending bulk checkout notification to {}", to);
            self.mailer
                .send(OutboundMail {
                    to,
                    subject: rendered.subject.clone(),
                    body: rendered.body.clone(),
                })
                .await?;
        }

        // Webhook summaries go out for every bulk checkout when an endpoint
        // is configured. Failures must not take the listener down.
        if let Some(endpoint) = settings.webhook_endpoint.as_deref().filter(|s| !s.is_empty()) {
            let summary = format!(
                "{} asset(s) checked out to {} by {}",
                event.assets.len(),
                event.target.name(),
                event.admin.display_name()
            );
            if let Err(e) = self
                .webhook
                .post_summary(endpoint, settings.webhook_channel.as_deref(), &summary)
                .await
            {
                warn!("Webhook delivery failed: {}", e);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::events::CheckoutTarget;
    use crate::notifications::mailer::testing::RecordingMailer;
    use chrono::NaiveDateTime;
    use migration::{Migrator, MigratorTrait};
    use model::entities::{asset, category, location, setting, user};
    use sea_orm::{ActiveModelTrait, Database, Set};

    async fn setup(settings: setting::ActiveModel) -> (NotificationListener, RecordingMailer) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        settings.insert(&db).await.expect("Failed to insert settings");

        let mailer = RecordingMailer::default();
        let cache = Cache::new(100);
        let listener = NotificationListener::new(db, cache, Arc::new(mailer.clone()));
        (listener, mailer)
    }

    fn default_settings() -> setting::ActiveModel {
        setting::ActiveModel {
            site_name: Set("assetrust".to_string()),
            ..Default::default()
        }
    }

    fn test_user(id: i32, email: Option<&str>) -> user::Model {
        user::Model {
            id,
            username: format!("user{id}"),
            first_name: None,
            last_name: None,
            email: email.map(str::to_string),
            activated: true,
            created_at: NaiveDateTime::default(),
            deleted_at: None,
        }
    }

    fn test_batch(require_acceptance: bool) -> Vec<(asset::Model, category::Model)> {
        let category = category::Model {
            id: 1,
            name: "Laptops".to_string(),
            require_acceptance,
            eula_text: None,
            use_default_eula: false,
            checkin_email: false,
        };
        (1..=2)
            .map(|id| {
                (
                    asset::Model {
                        id,
                        asset_tag: format!("ASSET-{id:04}"),
                        serial: format!("SN-{id}"),
                        name: None,
                        category_id: category.id,
                        manufacturer_id: None,
                        location_id: None,
                        assigned_to: None,
                        created_at: NaiveDateTime::default(),
                        updated_at: NaiveDateTime::default(),
                        deleted_at: None,
                    },
                    category.clone(),
                )
            })
            .collect()
    }

    fn bulk_event(
        assets: Vec<(asset::Model, category::Model)>,
        target: CheckoutTarget,
    ) -> AppEvent {
        AppEvent::BulkCheckedOut(BulkCheckedOut {
            assets,
            target,
            admin: test_user(99, None),
            checkout_at: NaiveDateTime::default(),
            expected_checkin: None,
            note: Some("A note here".to_string()),
        })
    }

    #[tokio::test]
    async fn mail_is_sent_to_user() {
        let (listener, mailer) = setup(default_settings()).await;
        let target = CheckoutTarget::User(test_user(1, Some("someone@example.com")));

        listener
            .handle(bulk_event(test_batch(true), target))
            .await
            .unwrap();

        assert_eq!(mailer.sent().len(), 1);
        assert!(mailer.sent_to("someone@example.com"));
    }

    #[tokio::test]
    async fn mail_is_not_sent_when_user_has_no_email() {
        let (listener, mailer) = setup(default_settings()).await;
        let target = CheckoutTarget::User(test_user(1, None));

        listener
            .handle(bulk_event(test_batch(true), target))
            .await
            .unwrap();

        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn mail_is_not_sent_when_assets_do_not_require_acceptance() {
        let (listener, mailer) = setup(default_settings()).await;
        let target = CheckoutTarget::User(test_user(1, Some("someone@example.com")));

        listener
            .handle(bulk_event(test_batch(false), target))
            .await
            .unwrap();

        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn cc_address_receives_a_copy() {
        let settings = setting::ActiveModel {
            site_name: Set("assetrust".to_string()),
            admin_cc_email: Set(Some("cc@example.com".to_string())),
            ..Default::default()
        };
        let (listener, mailer) = setup(settings).await;
        let target = CheckoutTarget::User(test_user(1, Some("someone@example.com")));

        listener
            .handle(bulk_event(test_batch(true), target))
            .await
            .unwrap();

        assert_eq!(mailer.sent().len(), 2);
        assert!(mailer.sent_to("someone@example.com"));
        assert!(mailer.sent_to("cc@example.com"));
    }

    #[tokio::test]
    async fn cc_address_skipped_without_acceptance() {
        let settings = setting::ActiveModel {
            site_name: Set("assetrust".to_string()),
            admin_cc_email: Set(Some("cc@example.com".to_string())),
            ..Default::default()
        };
        let (listener, mailer) = setup(settings).await;
        let target = CheckoutTarget::User(test_user(1, Some("someone@example.com")));

        listener
            .handle(bulk_event(test_batch(false), target))
            .await
            .unwrap();

        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn cc_always_sends_even_without_acceptance() {
        let settings = setting::ActiveModel {
            site_name: Set("assetrust".to_string()),
            admin_cc_email: Set(Some("cc@example.com".to_string())),
            admin_cc_always: Set(true),
            ..Default::default()
        };
        let (listener, mailer) = setup(settings).await;
        let target = CheckoutTarget::User(test_user(1, Some("someone@example.com")));

        listener
            .handle(bulk_event(test_batch(false), target))
            .await
            .unwrap();

        assert_eq!(mailer.sent().len(), 1);
        assert!(mailer.sent_to("cc@example.com"));
        assert!(!mailer.sent_to("someone@example.com"));
    }

    #[tokio::test]
    async fn location_target_only_reaches_the_cc_address() {
        let settings = setting::ActiveModel {
            site_name: Set("assetrust".to_string()),
            admin_cc_email: Set(Some("cc@example.com".to_string())),
            ..Default::default()
        };
        let (listener, mailer) = setup(settings).await;
        let target = CheckoutTarget::Location(location::Model {
            id: 1,
            name: "Warehouse".to_string(),
            address: None,
            city: None,
        });

        listener
            .handle(bulk_event(test_batch(true), target))
            .await
            .unwrap();

        assert_eq!(mailer.sent().len(), 1);
        assert!(mailer.sent_to("cc@example.com"));
    }
}
