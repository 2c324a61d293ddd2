//! Complaint lifecycle rules.
//!
//! Pure functions over a loaded complaint. Callers persist the result.

use chrono::{DateTime, Utc};
use fixit_common::{AppError, AppResult};
use fixit_db::entities::{
    complaint::{self, ComplaintStatus},
    user,
};

/// Message for any status change on a resolved or closed complaint.
pub const TERMINAL_LOCK_MESSAGE: &str = "Status cannot be changed after resolution/closure";

/// Message for an assignee without a staff role.
pub const INVALID_ASSIGNEE_MESSAGE: &str = "Invalid user for assignment";

/// Move a complaint to `to`.
///
/// Resolved and closed are terminal: the complaint is left untouched and
/// `InvalidTransition` is returned. Entering a terminal status stamps
/// `resolved_at` and `resolved_by`; `resolution` is only overwritten by
/// non-blank text.
pub fn transition(
    complaint: &mut complaint::Model,
    to: ComplaintStatus,
    actor_id: &str,
    resolution: Option<&str>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if complaint.status.is_terminal() {
        return Err(AppError::InvalidTransition(TERMINAL_LOCK_MESSAGE.to_string()));
    }

    complaint.status = to;
    if to.is_terminal() {
        complaint.resolved_at = Some(now);
        complaint.resolved_by = Some(actor_id.to_string());
        if let Some(text) = resolution.map(str::trim).filter(|t| !t.is_empty()) {
            complaint.resolution = text.to_string();
        }
    }
    complaint.updated_at = now;
    Ok(())
}

/// Only staff can be handed a complaint.
pub fn check_assignee(assignee: &user::Model) -> AppResult<()> {
    if assignee.role.is_staff() {
        Ok(())
    } else {
        Err(AppError::InvalidAssignee(INVALID_ASSIGNEE_MESSAGE.to_string()))
    }
}

/// Bind a staff member and force `in_progress`.
///
/// The terminal lock does not apply here, and neither the assignee's active
/// flag nor the resolution stamps are looked at.
pub fn assign(
    complaint: &mut complaint::Model,
    assignee: &user::Model,
    now: DateTime<Utc>,
) -> AppResult<()> {
    check_assignee(assignee)?;

    complaint.assigned_to = Some(assignee.id.clone());
    complaint.status = ComplaintStatus::InProgress;
    complaint.updated_at = now;
    Ok(())
}
