//! Complaint service.
//!
//! Filing, reading, the status lifecycle, assignment and the comment thread.

use chrono::Utc;
use fixit_common::{AppError, AppResult, IdGenerator};
use fixit_db::{
    entities::{
        complaint::{self, ComplaintCategory, ComplaintStatus, Priority},
        complaint_comment,
    },
    repositories::ComplaintFilter,
};
use serde::{Deserialize, Deserializer};
use validator::Validate;

use super::{Page, PageRequest};
use crate::{
    lifecycle,
    policy::{self, Action, Actor},
    store::{ComplaintStoreRef, UserStoreRef},
    validation,
    view::{self, ComplaintView, UserIndex},
};

const NOT_FOUND: &str = "Complaint not found";

/// Input for filing a complaint.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateComplaintInput {
    #[validate(custom(function = "validation::not_blank", message = "Title is required"))]
    pub title: String,

    #[validate(custom(function = "validation::not_blank", message = "Description is required"))]
    pub description: String,

    #[validate(custom(function = "validation::complaint_category"))]
    pub category: String,

    #[validate(custom(function = "validation::priority"))]
    pub priority: Option<String>,

    #[validate(custom(function = "validation::not_blank", message = "Room number is required"))]
    pub room_number: String,

    /// Stored as sent; `null` reads as no images.
    #[serde(deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Input for a lifecycle move.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateStatusInput {
    #[validate(custom(function = "validation::complaint_status"))]
    pub status: String,

    pub resolution: Option<String>,
}

/// Input for assigning a complaint.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignInput {
    #[validate(custom(function = "validation::not_blank", message = "Valid user ID required"))]
    pub assigned_to: String,
}

/// Input for appending a comment.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CommentInput {
    #[validate(custom(function = "validation::not_blank", message = "Comment is required"))]
    pub comment: String,
}

/// Listing filters and page position.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ComplaintQuery {
    #[validate(custom(function = "validation::complaint_status"))]
    pub status: Option<String>,

    #[validate(custom(function = "validation::complaint_category"))]
    pub category: Option<String>,

    #[validate(custom(function = "validation::priority"))]
    pub priority: Option<String>,

    pub page: Option<u64>,

    pub limit: Option<u64>,
}

/// Complaint service for business logic.
#[derive(Clone)]
pub struct ComplaintService {
    complaints: ComplaintStoreRef,
    users: UserStoreRef,
    id_gen: IdGenerator,
}

impl ComplaintService {
    /// Create a new complaint service.
    #[must_use]
    pub const fn new(complaints: ComplaintStoreRef, users: UserStoreRef) -> Self {
        Self {
            complaints,
            users,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a complaint owned by the caller.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateComplaintInput,
    ) -> AppResult<ComplaintView> {
        policy::authorize(actor, Action::CreateComplaint, None)?;
        input.validate()?;

        let category = ComplaintCategory::parse(&input.category)
            .ok_or_else(|| AppError::invalid_field("category", "Invalid category"))?;
        let priority = match input.priority.as_deref() {
            Some(p) => Priority::parse(p)
                .ok_or_else(|| AppError::invalid_field("priority", "Invalid priority"))?,
            None => Priority::default(),
        };
        let now = Utc::now();
        let model = complaint::Model {
            id: self.id_gen.generate(),
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            category,
            priority,
            status: ComplaintStatus::Pending,
            student_id: actor.id.clone(),
            assigned_to: None,
            room_number: input.room_number.trim().to_string(),
            images: serde_json::json!(input.images),
            resolution: String::new(),
            resolved_at: None,
            resolved_by: None,
            created_at: now,
            updated_at: now,
        };

        let complaint = self.complaints.insert_complaint(model).await?;
        tracing::info!(
            complaint_id = %complaint.id,
            student_id = %actor.id,
            category = category.as_str(),
            priority = priority.as_str(),
            "Complaint filed"
        );

        self.populate(complaint, Some(Vec::new())).await
    }

    /// Read one complaint with its thread.
    pub async fn get(&self, actor: &Actor, id: &str) -> AppResult<ComplaintView> {
        let complaint = self.load(id).await?;
        policy::authorize(actor, Action::ViewComplaint, Some(&complaint))?;

        let comments = self.complaints.comments(&complaint.id).await?;
        self.populate(complaint, Some(comments)).await
    }

    /// Newest-first listing. Students only ever see their own complaints.
    pub async fn list(
        &self,
        actor: &Actor,
        query: ComplaintQuery,
    ) -> AppResult<Page<ComplaintView>> {
        policy::authorize(actor, Action::ListComplaints, None)?;
        query.validate()?;

        let filter = ComplaintFilter {
            student_id: policy::listing_scope(actor),
            status: query.status.as_deref().and_then(ComplaintStatus::parse),
            category: query.category.as_deref().and_then(ComplaintCategory::parse),
            priority: query.priority.as_deref().and_then(Priority::parse),
        };
        let request = PageRequest::new(query.page, query.limit);

        let complaints = self
            .complaints
            .list_complaints(&filter, request.limit, request.offset())
            .await?;
        let total = self.complaints.count_complaints(&filter).await?;

        let mut ids: Vec<String> = complaints
            .iter()
            .flat_map(|c| view::referenced_users(c, &[]))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        let users = self.user_index(&ids).await?;

        let items = complaints
            .into_iter()
            .map(|c| ComplaintView::build(c, None, &users))
            .collect();
        Ok(Page::new(items, total, request))
    }

    /// Move a complaint through its lifecycle.
    pub async fn transition(
        &self,
        actor: &Actor,
        id: &str,
        input: UpdateStatusInput,
    ) -> AppResult<ComplaintView> {
        policy::authorize(actor, Action::ChangeStatus, None)?;
        input.validate()?;
        let to = ComplaintStatus::parse(&input.status)
            .ok_or_else(|| AppError::invalid_field("status", "Invalid status"))?;

        let mut complaint = self.load(id).await?;
        policy::authorize(actor, Action::ChangeStatus, Some(&complaint))?;

        let from = complaint.status;
        lifecycle::transition(
            &mut complaint,
            to,
            &actor.id,
            input.resolution.as_deref(),
            Utc::now(),
        )?;

        // Load-then-save without a version check; a concurrent writer can
        // slip past the terminal lock between the two.
        let complaint = self.complaints.save_complaint(complaint).await?;
        tracing::info!(
            complaint_id = %complaint.id,
            actor = %actor.id,
            from = from.as_str(),
            to = to.as_str(),
            "Complaint status changed"
        );

        let comments = self.complaints.comments(&complaint.id).await?;
        self.populate(complaint, Some(comments)).await
    }

    /// Hand a complaint to a staff member and mark it in progress.
    pub async fn assign(
        &self,
        actor: &Actor,
        id: &str,
        input: AssignInput,
    ) -> AppResult<ComplaintView> {
        policy::authorize(actor, Action::AssignComplaint, None)?;
        input.validate()?;

        let assignee = self
            .users
            .find_user(input.assigned_to.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        lifecycle::check_assignee(&assignee)?;

        let mut complaint = self.load(id).await?;
        lifecycle::assign(&mut complaint, &assignee, Utc::now())?;

        let complaint = self.complaints.save_complaint(complaint).await?;
        tracing::info!(
            complaint_id = %complaint.id,
            actor = %actor.id,
            assignee = %assignee.id,
            "Complaint assigned"
        );

        let comments = self.complaints.comments(&complaint.id).await?;
        self.populate(complaint, Some(comments)).await
    }

    /// Append to the comment thread.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        id: &str,
        input: CommentInput,
    ) -> AppResult<ComplaintView> {
        input.validate()?;

        let complaint = self.load(id).await?;
        policy::authorize(actor, Action::CommentOnComplaint, Some(&complaint))?;

        let comment = complaint_comment::Model {
            id: self.id_gen.generate(),
            complaint_id: complaint.id.clone(),
            user_id: actor.id.clone(),
            comment: input.comment.trim().to_string(),
            created_at: Utc::now(),
        };
        self.complaints.append_comment(comment).await?;
        tracing::info!(complaint_id = %complaint.id, author = %actor.id, "Comment added");

        let comments = self.complaints.comments(&complaint.id).await?;
        self.populate(complaint, Some(comments)).await
    }

    async fn load(&self, id: &str) -> AppResult<complaint::Model> {
        self.complaints
            .find_complaint(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    async fn user_index(&self, ids: &[String]) -> AppResult<UserIndex> {
        Ok(self
            .users
            .find_users(ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect())
    }

    async fn populate(
        &self,
        complaint: complaint::Model,
        comments: Option<Vec<complaint_comment::Model>>,
    ) -> AppResult<ComplaintView> {
        let ids = view::referenced_users(&complaint, comments.as_deref().unwrap_or_default());
        let users = self.user_index(&ids).await?;
        Ok(ComplaintView::build(complaint, comments, &users))
    }
}
