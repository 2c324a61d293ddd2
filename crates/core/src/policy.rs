//! Access policy.
//!
//! One table of who may do what. Services call [`authorize`] before touching
//! a resource instead of branching on roles themselves.

#![allow(missing_docs)]

use std::collections::BTreeSet;

use fixit_common::{AppError, AppResult};
use fixit_db::entities::{
    complaint,
    user::{self, Role},
};

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    /// Create an actor.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Whether the actor holds a staff role.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

impl From<&user::Model> for Actor {
    fn from(user: &user::Model) -> Self {
        Self::new(user.id.clone(), user.role)
    }
}

/// Operations subject to access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// File a new complaint.
    CreateComplaint,
    /// List complaints (students are scoped to their own).
    ListComplaints,
    /// Read one complaint.
    ViewComplaint,
    /// Append to a complaint's thread.
    CommentOnComplaint,
    /// Drive the lifecycle.
    ChangeStatus,
    /// Hand a complaint to staff.
    AssignComplaint,
    /// Read aggregate counts.
    ViewStatistics,
    /// List users and toggle their active flag.
    ManageUsers,
    /// Create, edit and delete categories.
    ManageCategories,
}

impl Action {
    const STUDENT_BASE: [Self; 2] = [Self::CreateComplaint, Self::ListComplaints];

    const OWNER: [Self; 2] = [Self::ViewComplaint, Self::CommentOnComplaint];

    const STAFF: [Self; 9] = [
        Self::CreateComplaint,
        Self::ListComplaints,
        Self::ViewComplaint,
        Self::CommentOnComplaint,
        Self::ChangeStatus,
        Self::AssignComplaint,
        Self::ViewStatistics,
        Self::ManageUsers,
        Self::ManageCategories,
    ];
}

/// Everything `actor` may do, optionally with respect to one complaint.
#[must_use]
pub fn allowed_actions(actor: &Actor, resource: Option<&complaint::Model>) -> BTreeSet<Action> {
    if actor.is_staff() {
        return Action::STAFF.into_iter().collect();
    }

    let mut actions: BTreeSet<_> = Action::STUDENT_BASE.into_iter().collect();
    if resource.is_some_and(|c| c.student_id == actor.id) {
        actions.extend(Action::OWNER);
    }
    actions
}

/// Owner restriction for complaint listings: students only see their own.
#[must_use]
pub fn listing_scope(actor: &Actor) -> Option<String> {
    (!actor.is_staff()).then(|| actor.id.clone())
}

/// Fail with `Forbidden("Access denied")` unless `action` is allowed.
pub fn authorize(
    actor: &Actor,
    action: Action,
    resource: Option<&complaint::Model>,
) -> AppResult<()> {
    if allowed_actions(actor, resource).contains(&action) {
        Ok(())
    } else {
        tracing::debug!(actor = %actor.id, ?action, "Access denied");
        Err(AppError::access_denied())
    }
}
