pub mod test_utils {
    use crate::notifications::listener::{self, NotificationListener};
    use crate::notifications::mailer::testing::RecordingMailer;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use moka::future::Cache;
    use sea_orm::{Database, DatabaseConnection};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, with the notification listener wired to
    /// a recording mailer.
    pub async fn setup_test_app_state() -> (AppState, RecordingMailer) {
        let db = setup_test_db().await;
        let cache = Cache::new(100);

        let mailer = RecordingMailer::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let notification_listener =
            NotificationListener::new(db.clone(), cache.clone(), Arc::new(mailer.clone()));
        listener::spawn(rx, notification_listener);

        (
            AppState {
                db,
                cache,
                events: tx,
            },
            mailer,
        )
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG, defaulting to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();

        let (state, _mailer) = setup_test_app_state().await;
        create_router(state)
    }
}
