//! Plan status lifecycle rules.
//!
//! Statuses advance along a single forward path:
//!
//! ```text
//! draft -> approved -> in_progress -> completed
//! ```
//!
//! There are no backward or skipping transitions. While a plan is
//! `approved` or `completed` its content is locked; the only permitted
//! change in those states is the next status step.

use turnnav_db::PlanStatus;

/// Whether `from -> to` is a permitted status transition.
pub fn is_valid_transition(from: PlanStatus, to: PlanStatus) -> bool {
    use PlanStatus::*;
    matches!(
        (from, to),
        (Draft, Approved) | (Approved, InProgress) | (InProgress, Completed)
    )
}

/// Whether a plan in `status` rejects edits to its title and details.
pub fn is_edit_locked(status: PlanStatus) -> bool {
    matches!(status, PlanStatus::Approved | PlanStatus::Completed)
}
