//! Storage seams.
//!
//! Services talk to persistence through these traits so the same business
//! rules run against `PostgreSQL` (the repositories in `fixit-db`) or the
//! in-process [`MemoryStore`](crate::memory::MemoryStore).

#![allow(missing_docs)]

use std::sync::Arc;

use async_trait::async_trait;
use fixit_common::AppResult;
use fixit_db::{
    entities::{
        category,
        complaint::{self, ComplaintCategory, ComplaintStatus, Priority},
        complaint_comment,
        user::{self, Role},
    },
    repositories::{CategoryRepository, ComplaintFilter, ComplaintRepository, UserRepository},
};
use sea_orm::{ActiveModelTrait, IntoActiveModel};

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: &str) -> AppResult<Option<user::Model>>;

    async fn find_users(&self, ids: &[String]) -> AppResult<Vec<user::Model>>;

    /// Lookup by email; implementations compare lowercase.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<user::Model>>;

    async fn find_user_by_student_id(&self, student_id: &str)
    -> AppResult<Option<user::Model>>;

    async fn insert_user(&self, user: user::Model) -> AppResult<user::Model>;

    async fn save_user(&self, user: user::Model) -> AppResult<user::Model>;

    /// Newest first.
    async fn list_users(
        &self,
        role: Option<Role>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>>;

    async fn count_users(&self, role: Option<Role>) -> AppResult<u64>;

    /// Active admins, technicians and wardens, sorted by name.
    async fn active_staff(&self) -> AppResult<Vec<user::Model>>;

    async fn count_users_by_role(&self) -> AppResult<Vec<(Role, u64)>>;

    async fn count_users_by_active(&self) -> AppResult<Vec<(bool, u64)>>;
}

/// Complaint and comment persistence.
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    async fn find_complaint(&self, id: &str) -> AppResult<Option<complaint::Model>>;

    async fn insert_complaint(&self, complaint: complaint::Model) -> AppResult<complaint::Model>;

    /// Overwrite the stored row. Last write wins.
    async fn save_complaint(&self, complaint: complaint::Model) -> AppResult<complaint::Model>;

    /// Newest first.
    async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<complaint::Model>>;

    async fn count_complaints(&self, filter: &ComplaintFilter) -> AppResult<u64>;

    /// Insertion order.
    async fn comments(&self, complaint_id: &str) -> AppResult<Vec<complaint_comment::Model>>;

    async fn append_comment(
        &self,
        comment: complaint_comment::Model,
    ) -> AppResult<complaint_comment::Model>;

    async fn count_by_status(&self) -> AppResult<Vec<(ComplaintStatus, u64)>>;

    async fn count_by_category(&self) -> AppResult<Vec<(ComplaintCategory, u64)>>;

    async fn count_by_priority(&self) -> AppResult<Vec<(Priority, u64)>>;
}

/// Category persistence.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn find_category(&self, id: &str) -> AppResult<Option<category::Model>>;

    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<category::Model>>;

    /// Active categories sorted by name.
    async fn active_categories(&self) -> AppResult<Vec<category::Model>>;

    async fn count_categories(&self) -> AppResult<u64>;

    async fn insert_category(&self, category: category::Model) -> AppResult<category::Model>;

    async fn save_category(&self, category: category::Model) -> AppResult<category::Model>;

    /// Returns whether a row was removed.
    async fn delete_category(&self, id: &str) -> AppResult<bool>;
}

/// Shared user store handle.
pub type UserStoreRef = Arc<dyn UserStore>;

/// Shared complaint store handle.
pub type ComplaintStoreRef = Arc<dyn ComplaintStore>;

/// Shared category store handle.
pub type CategoryStoreRef = Arc<dyn CategoryStore>;

// === PostgreSQL ===

#[async_trait]
impl UserStore for UserRepository {
    async fn find_user(&self, id: &str) -> AppResult<Option<user::Model>> {
        self.find_by_id(id).await
    }

    async fn find_users(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        self.find_by_ids(ids).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        self.find_by_email(email).await
    }

    async fn find_user_by_student_id(
        &self,
        student_id: &str,
    ) -> AppResult<Option<user::Model>> {
        self.find_by_student_id(student_id).await
    }

    async fn insert_user(&self, user: user::Model) -> AppResult<user::Model> {
        self.create(user.into_active_model().reset_all()).await
    }

    async fn save_user(&self, user: user::Model) -> AppResult<user::Model> {
        self.save(user).await
    }

    async fn list_users(
        &self,
        role: Option<Role>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        self.find_all(role, limit, offset).await
    }

    async fn count_users(&self, role: Option<Role>) -> AppResult<u64> {
        self.count(role).await
    }

    async fn active_staff(&self) -> AppResult<Vec<user::Model>> {
        self.find_active_staff().await
    }

    async fn count_users_by_role(&self) -> AppResult<Vec<(Role, u64)>> {
        self.count_by_role().await
    }

    async fn count_users_by_active(&self) -> AppResult<Vec<(bool, u64)>> {
        self.count_by_active().await
    }
}

#[async_trait]
impl ComplaintStore for ComplaintRepository {
    async fn find_complaint(&self, id: &str) -> AppResult<Option<complaint::Model>> {
        self.find_by_id(id).await
    }

    async fn insert_complaint(&self, complaint: complaint::Model) -> AppResult<complaint::Model> {
        self.create(complaint.into_active_model().reset_all()).await
    }

    async fn save_complaint(&self, complaint: complaint::Model) -> AppResult<complaint::Model> {
        self.save(complaint).await
    }

    async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<complaint::Model>> {
        self.find_filtered(filter, limit, offset).await
    }

    async fn count_complaints(&self, filter: &ComplaintFilter) -> AppResult<u64> {
        self.count_filtered(filter).await
    }

    async fn comments(&self, complaint_id: &str) -> AppResult<Vec<complaint_comment::Model>> {
        self.find_comments(complaint_id).await
    }

    async fn append_comment(
        &self,
        comment: complaint_comment::Model,
    ) -> AppResult<complaint_comment::Model> {
        ComplaintRepository::append_comment(self, comment.into_active_model().reset_all()).await
    }

    async fn count_by_status(&self) -> AppResult<Vec<(ComplaintStatus, u64)>> {
        ComplaintRepository::count_by_status(self).await
    }

    async fn count_by_category(&self) -> AppResult<Vec<(ComplaintCategory, u64)>> {
        ComplaintRepository::count_by_category(self).await
    }

    async fn count_by_priority(&self) -> AppResult<Vec<(Priority, u64)>> {
        ComplaintRepository::count_by_priority(self).await
    }
}

#[async_trait]
impl CategoryStore for CategoryRepository {
    async fn find_category(&self, id: &str) -> AppResult<Option<category::Model>> {
        self.find_by_id(id).await
    }

    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<category::Model>> {
        self.find_by_name(name).await
    }

    async fn active_categories(&self) -> AppResult<Vec<category::Model>> {
        self.find_active().await
    }

    async fn count_categories(&self) -> AppResult<u64> {
        self.count().await
    }

    async fn insert_category(&self, category: category::Model) -> AppResult<category::Model> {
        self.create(category.into_active_model().reset_all()).await
    }

    async fn save_category(&self, category: category::Model) -> AppResult<category::Model> {
        self.save(category).await
    }

    async fn delete_category(&self, id: &str) -> AppResult<bool> {
        self.delete(id).await
    }
}
