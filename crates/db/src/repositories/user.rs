//! User repository.

use std::sync::Arc;

use crate::entities::{
    User,
    user::{self, Role},
};
use fixit_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

#[derive(FromQueryResult)]
struct RoleCount {
    role: Role,
    count: i64,
}

#[derive(FromQueryResult)]
struct ActiveCount {
    is_active: bool,
    count: i64,
}

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by institutional student number.
    pub async fn find_by_student_id(&self, student_id: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::StudentId.eq(student_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write every column of a loaded user back.
    pub async fn save(&self, model: user::Model) -> AppResult<user::Model> {
        model
            .into_active_model()
            .reset_all()
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List users, newest first, optionally restricted to one role.
    pub async fn find_all(
        &self,
        role: Option<Role>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        let mut query = User::find().order_by_desc(user::Column::CreatedAt);

        if let Some(r) = role {
            query = query.filter(user::Column::Role.eq(r));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users, optionally restricted to one role.
    pub async fn count(&self, role: Option<Role>) -> AppResult<u64> {
        let mut query = User::find();

        if let Some(r) = role {
            query = query.filter(user::Column::Role.eq(r));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active users holding a staff role, sorted by name.
    pub async fn find_active_staff(&self) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::Role.is_in(Role::STAFF))
            .filter(user::Column::IsActive.eq(true))
            .order_by_asc(user::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of users per role. Roles without users are absent.
    pub async fn count_by_role(&self) -> AppResult<Vec<(Role, u64)>> {
        let rows = User::find()
            .select_only()
            .column(user::Column::Role)
            .column_as(user::Column::Id.count(), "count")
            .group_by(user::Column::Role)
            .into_model::<RoleCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.role, row.count.unsigned_abs()))
            .collect())
    }

    /// Number of users per active flag.
    pub async fn count_by_active(&self) -> AppResult<Vec<(bool, u64)>> {
        let rows = User::find()
            .select_only()
            .column(user::Column::IsActive)
            .column_as(user::Column::Id.count(), "count")
            .group_by(user::Column::IsActive)
            .into_model::<ActiveCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.is_active, row.count.unsigned_abs()))
            .collect())
    }
}
