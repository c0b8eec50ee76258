use chrono::{NaiveDate, NaiveDateTime};
use model::entities::{asset, category, location, user};

/// Who received a bulk checkout.
#[derive(Debug, Clone)]
pub enum CheckoutTarget {
    User(user::Model),
    Location(location::Model),
}

impl CheckoutTarget {
    /// Email address to notify, when the target has one.
    pub fn email(&self) -> Option<&str> {
        match self {
            CheckoutTarget::User(user) => user.email.as_deref(),
            CheckoutTarget::Location(_) => None,
        }
    }

    pub fn name(&self) -> String {
        match self {
            CheckoutTarget::User(user) => user.display_name(),
            CheckoutTarget::Location(location) => location.name.clone(),
        }
    }
}

/// A batch of assets checked out to one target in a single request.
///
/// Categories are carried alongside their assets so the listener can apply
/// acceptance and EULA rules without re-reading the database.
#[derive(Debug, Clone)]
pub struct BulkCheckedOut {
    pub assets: Vec<(asset::Model, category::Model)>,
    pub target: CheckoutTarget,
    pub admin: user::Model,
    pub checkout_at: NaiveDateTime,
    pub expected_checkin: Option<NaiveDate>,
    pub note: Option<String>,
}

impl BulkCheckedOut {
    /// True when any checked-out asset's category requires the recipient to
    /// accept the terms of use.
    pub fn requires_acceptance(&self) -> bool {
        self.assets
            .iter()
            .any(|(_, category)| category.require_acceptance)
    }
}

/// Events published on the application event channel.
#[derive(Debug, Clone)]
pub enum AppEvent {
    BulkCheckedOut(BulkCheckedOut),
}
