//! # Membership Expiry Policy
//!
//! Stateless classification of a membership as active or expired relative to
//! a reference date. Advisory only: nothing here (or anywhere in the core)
//! auto-deactivates a membership; expiry is a derived, reportable state.

use chrono::NaiveDate;

use crate::models::membership;

/// Returns true when the membership is flagged active and has not passed its
/// expiry date as of `as_of`. The expiry date itself is the last valid day.
pub fn is_active(membership: &membership::Model, as_of: NaiveDate) -> bool {
    membership.active && membership.expiry_date >= as_of
}
