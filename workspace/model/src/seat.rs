//! License-seat update planning.
//!
//! A seat update request carries tri-state fields: a field can be absent
//! (leave alone), explicitly null (clear), or set to an id. The planner takes
//! the current seat row plus the patch and decides which transition the
//! update represents, without touching the database. The HTTP handler then
//! resolves targets, persists, and writes the audit log accordingly.

use crate::entities::license_seat;

/// Tri-state patch field: absent, explicit null, or a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T: Clone> Patch<T> {
    /// The value the field would hold after applying this patch.
    pub fn apply(&self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Missing => current,
            Patch::Null => None,
            Patch::Value(v) => Some(v.clone()),
        }
    }
}

/// Requested changes to a seat. Anything not listed here (`license_id`,
/// `created_by`, timestamps, the unreassignable flag) is not writable
/// through the update endpoint.
#[derive(Debug, Clone, Default)]
pub struct SeatPatch {
    pub assigned_to: Patch<i32>,
    pub asset_id: Patch<i32>,
    pub notes: Patch<String>,
}

/// Who or what holds (or held) a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatHolder {
    User(i32),
    Asset(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatUpdateViolation {
    /// The patched seat would be assigned to a user and an asset at once.
    BothTargets,
    /// The seat is flagged unreassignable and the assignment was touched.
    UnreassignableSeat,
}

/// The transition a seat patch represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatTransition {
    /// Nothing changed; respond with success without writing.
    Unchanged,
    /// Only the notes changed.
    NotesOnly,
    /// Assignment cleared. `previous` is the prior holder, which may already
    /// be gone (soft-deleted or purged); the audit log still records its id.
    Checkin { previous: Option<SeatHolder> },
    /// Assignment set or moved to a new holder.
    Checkout { to: SeatHolder },
    Rejected(SeatUpdateViolation),
}

/// Decide what a seat update means.
pub fn plan_seat_update(seat: &license_seat::Model, patch: &SeatPatch) -> SeatTransition {
    let new_assigned = patch.assigned_to.apply(seat.assigned_to);
    let new_asset = patch.asset_id.apply(seat.asset_id);
    let new_notes = patch.notes.apply(seat.notes.clone());

    let assigned_dirty = new_assigned != seat.assigned_to;
    let asset_dirty = new_asset != seat.asset_id;
    let notes_dirty = new_notes != seat.notes;
    let assignment_touched = assigned_dirty || asset_dirty;

    if !assignment_touched {
        return if notes_dirty {
            SeatTransition::NotesOnly
        } else {
            SeatTransition::Unchanged
        };
    }

    if seat.unreassignable_seat {
        return SeatTransition::Rejected(SeatUpdateViolation::UnreassignableSeat);
    }

    if new_assigned.is_some() && new_asset.is_some() {
        return SeatTransition::Rejected(SeatUpdateViolation::BothTargets);
    }

    // At most one side is non-null past the rejection above, so the end
    // state decides: a remaining holder is a checkout, an empty assignment
    // a checkin.
    match new_asset
        .map(SeatHolder::Asset)
        .or(new_assigned.map(SeatHolder::User))
    {
        Some(to) => SeatTransition::Checkout { to },
        None => {
            let previous = if asset_dirty {
                seat.asset_id.map(SeatHolder::Asset)
            } else {
                seat.assigned_to.map(SeatHolder::User)
            };
            SeatTransition::Checkin { previous }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn seat(assigned_to: Option<i32>, asset_id: Option<i32>) -> license_seat::Model {
        let ts = NaiveDateTime::default();
        license_seat::Model {
            id: 1,
            license_id: 10,
            assigned_to,
            asset_id,
            notes: Some("existing".to_string()),
            unreassignable_seat: false,
            created_by: None,
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
        }
    }

    #[test]
    fn empty_patch_is_unchanged() {
        let plan = plan_seat_update(&seat(Some(5), None), &SeatPatch::default());
        assert_eq!(plan, SeatTransition::Unchanged);
    }

    #[test]
    fn same_values_are_unchanged() {
        let patch = SeatPatch {
            assigned_to: Patch::Value(5),
            notes: Patch::Value("existing".to_string()),
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(Some(5), None), &patch);
        assert_eq!(plan, SeatTransition::Unchanged);
    }

    #[test]
    fn notes_change_without_assignment() {
        let patch = SeatPatch {
            notes: Patch::Value("new note".to_string()),
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(Some(5), None), &patch);
        assert_eq!(plan, SeatTransition::NotesOnly);
    }

    #[test]
    fn clearing_notes_is_notes_only() {
        let patch = SeatPatch {
            notes: Patch::Null,
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(None, None), &patch);
        assert_eq!(plan, SeatTransition::NotesOnly);
    }

    #[test]
    fn assigning_user_to_free_seat_is_checkout() {
        let patch = SeatPatch {
            assigned_to: Patch::Value(7),
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(None, None), &patch);
        assert_eq!(
            plan,
            SeatTransition::Checkout {
                to: SeatHolder::User(7)
            }
        );
    }

    #[test]
    fn assigning_asset_to_free_seat_is_checkout() {
        let patch = SeatPatch {
            asset_id: Patch::Value(42),
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(None, None), &patch);
        assert_eq!(
            plan,
            SeatTransition::Checkout {
                to: SeatHolder::Asset(42)
            }
        );
    }

    #[test]
    fn clearing_user_is_checkin_against_prior_user() {
        let patch = SeatPatch {
            assigned_to: Patch::Null,
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(Some(5), None), &patch);
        assert_eq!(
            plan,
            SeatTransition::Checkin {
                previous: Some(SeatHolder::User(5))
            }
        );
    }

    #[test]
    fn clearing_asset_is_checkin_against_prior_asset() {
        let patch = SeatPatch {
            asset_id: Patch::Null,
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(None, Some(42)), &patch);
        assert_eq!(
            plan,
            SeatTransition::Checkin {
                previous: Some(SeatHolder::Asset(42))
            }
        );
    }

    #[test]
    fn moving_between_users_is_checkout() {
        let patch = SeatPatch {
            assigned_to: Patch::Value(8),
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(Some(5), None), &patch);
        assert_eq!(
            plan,
            SeatTransition::Checkout {
                to: SeatHolder::User(8)
            }
        );
    }

    #[test]
    fn swapping_user_for_asset_in_one_patch_checks_out_to_asset() {
        let patch = SeatPatch {
            assigned_to: Patch::Null,
            asset_id: Patch::Value(42),
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(Some(5), None), &patch);
        assert_eq!(
            plan,
            SeatTransition::Checkout {
                to: SeatHolder::Asset(42)
            }
        );
    }

    #[test]
    fn swapping_asset_for_user_in_one_patch_checks_out_to_user() {
        let patch = SeatPatch {
            assigned_to: Patch::Value(7),
            asset_id: Patch::Null,
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(None, Some(42)), &patch);
        assert_eq!(
            plan,
            SeatTransition::Checkout {
                to: SeatHolder::User(7)
            }
        );
    }

    #[test]
    fn user_and_asset_together_are_rejected() {
        let patch = SeatPatch {
            assigned_to: Patch::Value(5),
            asset_id: Patch::Value(42),
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(None, None), &patch);
        assert_eq!(
            plan,
            SeatTransition::Rejected(SeatUpdateViolation::BothTargets)
        );
    }

    #[test]
    fn assigning_asset_over_existing_user_is_rejected() {
        let patch = SeatPatch {
            asset_id: Patch::Value(42),
            ..Default::default()
        };
        let plan = plan_seat_update(&seat(Some(5), None), &patch);
        assert_eq!(
            plan,
            SeatTransition::Rejected(SeatUpdateViolation::BothTargets)
        );
    }

    #[test]
    fn unreassignable_seat_rejects_assignment_changes() {
        let mut s = seat(Some(5), None);
        s.unreassignable_seat = true;
        let patch = SeatPatch {
            assigned_to: Patch::Null,
            ..Default::default()
        };
        let plan = plan_seat_update(&s, &patch);
        assert_eq!(
            plan,
            SeatTransition::Rejected(SeatUpdateViolation::UnreassignableSeat)
        );
    }

    #[test]
    fn unreassignable_seat_still_accepts_notes() {
        let mut s = seat(Some(5), None);
        s.unreassignable_seat = true;
        let patch = SeatPatch {
            notes: Patch::Value("still fine".to_string()),
            ..Default::default()
        };
        let plan = plan_seat_update(&s, &patch);
        assert_eq!(plan, SeatTransition::NotesOnly);
    }
}
