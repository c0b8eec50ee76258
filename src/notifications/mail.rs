//! Bulk checkout mail assembly.
//!
//! Builds the subject and plain-text body for a [`BulkCheckedOut`] event.
//! The rules mirror the checkout flow: the subject names the asset tag for a
//! single asset and switches to a count for more, the introduction differs
//! for location targets, and a EULA is attached only when every asset in the
//! batch shares one category.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use model::entities::{asset, category, setting};

use super::events::{BulkCheckedOut, CheckoutTarget};

/// A rendered (but unaddressed) bulk checkout notification.
#[derive(Debug, Clone)]
pub struct BulkCheckoutMail {
    pub subject: String,
    pub body: String,
    pub requires_acceptance: bool,
}

/// The EULA text a category carries: its own text, or the site-wide default
/// when the category opts into it.
pub fn effective_eula(category: &category::Model, settings: &setting::Model) -> Option<String> {
    if category.use_default_eula {
        settings.default_eula_text.clone()
    } else {
        category.eula_text.clone()
    }
}

/// Assemble subject and body for a bulk checkout event.
pub fn build(event: &BulkCheckedOut, settings: &setting::Model) -> BulkCheckoutMail {
    let requires_acceptance = event.requires_acceptance();
    let count = event.assets.len();

    let subject = if count == 1 {
        let (asset, _) = &event.assets[0];
        format!("Asset checkout notification: {}", asset.asset_tag)
    } else {
        format!("{count} assets checked out")
    };

    let introduction = match &event.target {
        CheckoutTarget::Location(location) => {
            if count == 1 {
                format!("A new item has been checked out to location {}.", location.name)
            } else {
                format!("{count} items have been checked out to location {}.", location.name)
            }
        }
        CheckoutTarget::User(_) => {
            if count == 1 {
                "A new item has been checked out to you.".to_string()
            } else {
                format!("{count} items have been checked out to you.")
            }
        }
    };

    let mut body = String::new();
    let _ = writeln!(body, "{introduction}");

    if requires_acceptance {
        let _ = writeln!(body);
        if count == 1 {
            let _ = writeln!(body, "This item requires acceptance.");
        } else {
            let _ = writeln!(body, "One or more items require acceptance.");
        }
        let _ = writeln!(
            body,
            "Please review the terms of use and accept the items."
        );
    }

    if let Some(expected) = event.expected_checkin {
        let _ = writeln!(body);
        let _ = writeln!(body, "Expected checkin date: {expected}");
    }

    if let Some(note) = event.note.as_deref().filter(|n| !n.is_empty()) {
        let _ = writeln!(body);
        let _ = writeln!(body, "Additional notes: {note}");
    }

    if let Some(eula) = singular_eula(event, settings) {
        let _ = writeln!(body);
        let _ = writeln!(body, "---");
        let _ = writeln!(body, "{eula}");
        let _ = writeln!(body, "---");
    }

    for (category, assets) in assets_by_category(event) {
        let _ = writeln!(body);
        let _ = writeln!(body, "{}:", category.name);
        for asset in assets {
            let _ = writeln!(
                body,
                "  - {} (tag {}, serial {})",
                asset.display_name(),
                asset.asset_tag,
                asset.serial
            );
        }
    }

    let _ = writeln!(body);
    let _ = writeln!(body, "Administrator: {}", event.admin.display_name());
    let _ = writeln!(body);
    let _ = writeln!(body, "Best regards,");
    let _ = writeln!(body, "{}", settings.site_name);

    BulkCheckoutMail {
        subject,
        body,
        requires_acceptance,
    }
}

/// The shared EULA, present only when every asset belongs to one category.
fn singular_eula(event: &BulkCheckedOut, settings: &setting::Model) -> Option<String> {
    let categories: BTreeSet<i32> = event
        .assets
        .iter()
        .map(|(_, category)| category.id)
        .collect();

    if categories.len() != 1 {
        return None;
    }

    event
        .assets
        .first()
        .and_then(|(_, category)| effective_eula(category, settings))
}

/// Group the batch by category, ordered by category id.
fn assets_by_category(
    event: &BulkCheckedOut,
) -> Vec<(&category::Model, Vec<&asset::Model>)> {
    let mut grouped: BTreeMap<i32, (&category::Model, Vec<&asset::Model>)> = BTreeMap::new();

    for (asset, category) in &event.assets {
        grouped
            .entry(category.id)
            .or_insert_with(|| (category, Vec::new()))
            .1
            .push(asset);
    }

    grouped.into_values().collect()
}
