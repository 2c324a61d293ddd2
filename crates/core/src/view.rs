//! Populated read models.
//!
//! Complaints store bare user IDs. These views resolve them to the display
//! fields clients render; a dangling reference becomes `null`.

#![allow(missing_docs)]

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use fixit_db::entities::{
    complaint::{self, ComplaintCategory, ComplaintStatus, Priority},
    complaint_comment,
    user::{self, Role},
};
use serde::Serialize;

/// Filing student as shown on a complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    pub id: String,
    pub name: String,
    pub email: String,
    pub student_id: Option<String>,
    pub room_number: Option<String>,
}

impl From<&user::Model> for StudentRef {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            student_id: user.student_id.clone(),
            room_number: user.room_number.clone(),
        }
    }
}

/// Staff member as shown on a complaint and in the assignee picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffRef {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&user::Model> for StaffRef {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Comment author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRef {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl From<&user::Model> for AuthorRef {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// One comment with its author resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub user: Option<AuthorRef>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A complaint with every user reference resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: Priority,
    pub status: ComplaintStatus,
    pub student: Option<StudentRef>,
    pub assigned_to: Option<StaffRef>,
    pub room_number: String,
    pub images: Vec<String>,
    pub resolution: String,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<StaffRef>,
    /// Absent in listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentView>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Users keyed by ID, for resolving references.
pub type UserIndex = HashMap<String, user::Model>;

/// Every user ID a complaint (and optionally its thread) refers to.
#[must_use]
pub fn referenced_users(
    complaint: &complaint::Model,
    comments: &[complaint_comment::Model],
) -> Vec<String> {
    let mut ids = vec![complaint.student_id.clone()];
    ids.extend(complaint.assigned_to.iter().cloned());
    ids.extend(complaint.resolved_by.iter().cloned());
    ids.extend(comments.iter().map(|c| c.user_id.clone()));
    ids.sort_unstable();
    ids.dedup();
    ids
}

impl ComplaintView {
    /// Build the view. `comments` is `None` for listings.
    #[must_use]
    pub fn build(
        complaint: complaint::Model,
        comments: Option<Vec<complaint_comment::Model>>,
        users: &UserIndex,
    ) -> Self {
        let images = complaint.image_urls();
        let lookup = |id: &str| users.get(id);

        Self {
            student: lookup(&complaint.student_id).map(StudentRef::from),
            assigned_to: complaint
                .assigned_to
                .as_deref()
                .and_then(lookup)
                .map(StaffRef::from),
            resolved_by: complaint
                .resolved_by
                .as_deref()
                .and_then(lookup)
                .map(StaffRef::from),
            comments: comments.map(|thread| {
                thread
                    .into_iter()
                    .map(|c| CommentView {
                        user: lookup(&c.user_id).map(AuthorRef::from),
                        id: c.id,
                        comment: c.comment,
                        created_at: c.created_at,
                    })
                    .collect()
            }),
            id: complaint.id,
            title: complaint.title,
            description: complaint.description,
            category: complaint.category,
            priority: complaint.priority,
            status: complaint.status,
            room_number: complaint.room_number,
            images,
            resolution: complaint.resolution,
            resolved_at: complaint.resolved_at,
            created_at: complaint.created_at,
            updated_at: complaint.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: format!("name-{id}"),
            email: format!("{id}@example.com"),
            password_hash: "hash".to_string(),
            role,
            student_id: Some("S-1".to_string()),
            room_number: Some("A-1".to_string()),
            phone: "555".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn complaint() -> complaint::Model {
        complaint::Model {
            id: "c1".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            category: ComplaintCategory::Security,
            priority: Priority::Urgent,
            status: ComplaintStatus::InProgress,
            student_id: "s1".to_string(),
            assigned_to: Some("gone".to_string()),
            room_number: "A-1".to_string(),
            images: serde_json::json!(["a.png", "b.png"]),
            resolution: String::new(),
            resolved_at: None,
            resolved_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_dangling_reference_is_null() {
        let users: UserIndex = [("s1".to_string(), person("s1", Role::Student))].into();

        let view = ComplaintView::build(complaint(), None, &users);
        let json = serde_json::to_value(&view).unwrap_or_default();

        assert_eq!(json["student"]["studentId"], "S-1");
        assert!(json["assignedTo"].is_null());
        assert!(json["resolvedBy"].is_null());
        assert!(json.get("comments").is_none());
        assert_eq!(json["images"], serde_json::json!(["a.png", "b.png"]));
        assert_eq!(json["status"], "in_progress");
    }

    #[test]
    fn test_referenced_users_deduplicated() {
        let comment = complaint_comment::Model {
            id: "m1".to_string(),
            complaint_id: "c1".to_string(),
            user_id: "s1".to_string(),
            comment: "hi".to_string(),
            created_at: Utc::now(),
        };

        let ids = referenced_users(&complaint(), &[comment]);

        assert_eq!(ids, ["gone", "s1"]);
    }
}
