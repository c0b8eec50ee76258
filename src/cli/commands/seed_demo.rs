use anyhow::Result;
use model::entities::{
    asset, category, license, license_seat, location, maintenance,
    maintenance::MaintenanceType, manufacturer, setting, user,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tracing::{debug, error, info, trace, warn};

/// Load a small, deterministic demo dataset.
///
/// The same rows come out every run, so the command is only useful against a
/// fresh database; it refuses to run when users already exist.
pub async fn seed_demo(database_url: &str) -> Result<()> {
    trace!("Entering seed_demo function");
    info!("Seeding demo data");
    debug!("Database URL: {}", database_url);

    let db: DatabaseConnection = match Database::connect(database_url).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            connection
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            return Err(e.into());
        }
    };

    let existing_users = user::Entity::find().count(&db).await?;
    if existing_users > 0 {
        warn!(
            "Database already holds {} users, refusing to seed demo data",
            existing_users
        );
        return Ok(());
    }

    info!("Creating demo users");
    let admin = user::ActiveModel {
        username: Set("admin".to_string()),
        first_name: Set(Some("Ada".to_string())),
        last_name: Set(Some("Admin".to_string())),
        email: Set(Some("admin@example.com".to_string())),
        activated: Set(true),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    let alice = user::ActiveModel {
        username: Set("alice".to_string()),
        first_name: Set(Some("Alice".to_string())),
        last_name: Set(Some("Anderson".to_string())),
        email: Set(Some("alice@example.com".to_string())),
        activated: Set(true),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    user::ActiveModel {
        username: Set("bob".to_string()),
        first_name: Set(Some("Bob".to_string())),
        last_name: Set(Some("Brown".to_string())),
        activated: Set(true),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    info!("Creating demo locations and categories");
    let office = location::ActiveModel {
        name: Set("Head Office".to_string()),
        address: Set(Some("1 Example Street".to_string())),
        city: Set(Some("Springfield".to_string())),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    location::ActiveModel {
        name: Set("Warehouse".to_string()),
        city: Set(Some("Springfield".to_string())),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    let laptops = category::ActiveModel {
        name: Set("Laptops".to_string()),
        require_acceptance: Set(true),
        eula_text: Set(Some(
            "Handle with care and return on request.".to_string(),
        )),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    let displays = category::ActiveModel {
        name: Set("Displays".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    let software = category::ActiveModel {
        name: Set("Software".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    let maker = manufacturer::ActiveModel {
        name: Set("Example Computing".to_string()),
        url: Set(Some("https://example.com".to_string())),
        support_email: Set(Some("support@example.com".to_string())),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    info!("Creating demo assets");
    let laptop = asset::ActiveModel {
        asset_tag: Set("AST-0001".to_string()),
        serial: Set("SN-1001".to_string()),
        name: Set(Some("Dev laptop".to_string())),
        category_id: Set(laptops.id),
        manufacturer_id: Set(Some(maker.id)),
        location_id: Set(Some(office.id)),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    asset::ActiveModel {
        asset_tag: Set("AST-0002".to_string()),
        serial: Set("SN-1002".to_string()),
        category_id: Set(displays.id),
        manufacturer_id: Set(Some(maker.id)),
        location_id: Set(Some(office.id)),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    info!("Creating demo license with seats");
    let license_row = license::ActiveModel {
        name: Set("Example IDE".to_string()),
        product_key: Set(Some("EXMPL-0000-0000".to_string())),
        seats: Set(3),
        reassignable: Set(true),
        purchase_cost: Set(Some(Decimal::new(19999, 2))),
        category_id: Set(Some(software.id)),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    for _ in 0..3 {
        license_seat::ActiveModel {
            license_id: Set(license_row.id),
            created_by: Set(Some(admin.id)),
            ..Default::default()
        }
        .insert(&db)
        .await?;
    }

    info!("Creating demo maintenance record");
    maintenance::ActiveModel {
        asset_id: Set(laptop.id),
        maintenance_type: Set(MaintenanceType::Repair),
        name: Set("Keyboard replacement".to_string()),
        start_date: Set(chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .ok_or_else(|| anyhow::anyhow!("invalid seed date"))?),
        is_warranty: Set(true),
        created_by: Set(Some(admin.id)),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    info!("Creating settings row");
    setting::ActiveModel {
        site_name: Set("assetrust demo".to_string()),
        admin_cc_email: Set(Some("it@example.com".to_string())),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    info!(
        "Demo data loaded: admin user id {}, sample user id {}",
        admin.id, alice.id
    );
    trace!("seed_demo function completed");

    Ok(())
}
