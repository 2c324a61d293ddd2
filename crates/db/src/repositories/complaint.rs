//! Complaint repository.
//!
//! Complaints and their comment threads. Every write is a plain load-then-save
//! of one row; there is no version column.

use std::sync::Arc;

use crate::entities::{
    Complaint, ComplaintComment,
    complaint::{self, ComplaintCategory, ComplaintStatus, Priority},
    complaint_comment,
};
use fixit_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

/// Criteria for complaint listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    /// Only complaints filed by this student.
    pub student_id: Option<String>,
    pub status: Option<ComplaintStatus>,
    pub category: Option<ComplaintCategory>,
    pub priority: Option<Priority>,
}

impl ComplaintFilter {
    /// Whether a complaint satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, complaint: &complaint::Model) -> bool {
        self.student_id
            .as_deref()
            .is_none_or(|id| complaint.student_id == id)
            && self.status.is_none_or(|s| complaint.status == s)
            && self.category.is_none_or(|c| complaint.category == c)
            && self.priority.is_none_or(|p| complaint.priority == p)
    }

    fn apply(&self, mut query: Select<Complaint>) -> Select<Complaint> {
        if let Some(id) = &self.student_id {
            query = query.filter(complaint::Column::StudentId.eq(id.as_str()));
        }
        if let Some(s) = self.status {
            query = query.filter(complaint::Column::Status.eq(s));
        }
        if let Some(c) = self.category {
            query = query.filter(complaint::Column::Category.eq(c));
        }
        if let Some(p) = self.priority {
            query = query.filter(complaint::Column::Priority.eq(p));
        }
        query
    }
}

#[derive(FromQueryResult)]
struct StatusCount {
    status: ComplaintStatus,
    count: i64,
}

#[derive(FromQueryResult)]
struct CategoryCount {
    category: ComplaintCategory,
    count: i64,
}

#[derive(FromQueryResult)]
struct PriorityCount {
    priority: Priority,
    count: i64,
}

/// Complaint repository for database operations.
#[derive(Clone)]
pub struct ComplaintRepository {
    db: Arc<DatabaseConnection>,
}

impl ComplaintRepository {
    /// Create a new complaint repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a complaint by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<complaint::Model>> {
        Complaint::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new complaint.
    pub async fn create(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write every column of a loaded complaint back. Last write wins.
    pub async fn save(&self, model: complaint::Model) -> AppResult<complaint::Model> {
        model
            .into_active_model()
            .reset_all()
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List complaints matching a filter, newest first.
    pub async fn find_filtered(
        &self,
        filter: &ComplaintFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<complaint::Model>> {
        filter
            .apply(Complaint::find())
            .order_by_desc(complaint::Column::CreatedAt)
            .order_by_desc(complaint::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count complaints matching a filter.
    pub async fn count_filtered(&self, filter: &ComplaintFilter) -> AppResult<u64> {
        filter
            .apply(Complaint::find())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ========== Comments ==========

    /// Comment thread of a complaint, in insertion order.
    pub async fn find_comments(
        &self,
        complaint_id: &str,
    ) -> AppResult<Vec<complaint_comment::Model>> {
        ComplaintComment::find()
            .filter(complaint_comment::Column::ComplaintId.eq(complaint_id))
            .order_by_asc(complaint_comment::Column::CreatedAt)
            .order_by_asc(complaint_comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append one comment.
    pub async fn append_comment(
        &self,
        model: complaint_comment::ActiveModel,
    ) -> AppResult<complaint_comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ========== Statistics ==========

    /// Number of complaints per status. Statuses without complaints are absent.
    pub async fn count_by_status(&self) -> AppResult<Vec<(ComplaintStatus, u64)>> {
        let rows = Complaint::find()
            .select_only()
            .column(complaint::Column::Status)
            .column_as(complaint::Column::Id.count(), "count")
            .group_by(complaint::Column::Status)
            .into_model::<StatusCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.status, row.count.unsigned_abs()))
            .collect())
    }

    /// Number of complaints per category.
    pub async fn count_by_category(&self) -> AppResult<Vec<(ComplaintCategory, u64)>> {
        let rows = Complaint::find()
            .select_only()
            .column(complaint::Column::Category)
            .column_as(complaint::Column::Id.count(), "count")
            .group_by(complaint::Column::Category)
            .into_model::<CategoryCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.category, row.count.unsigned_abs()))
            .collect())
    }

    /// Number of complaints per priority.
    pub async fn count_by_priority(&self) -> AppResult<Vec<(Priority, u64)>> {
        let rows = Complaint::find()
            .select_only()
            .column(complaint::Column::Priority)
            .column_as(complaint::Column::Id.count(), "count")
            .group_by(complaint::Column::Priority)
            .into_model::<PriorityCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.priority, row.count.unsigned_abs()))
            .collect())
    }
}
