//! In-process store.
//!
//! Backs the server when no database URL is configured and every service
//! test. Uniqueness rules mirror the database indexes.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashMap},
};

use async_trait::async_trait;
use fixit_common::{AppError, AppResult};
use fixit_db::{
    entities::{
        category,
        complaint::{self, ComplaintCategory, ComplaintStatus, Priority},
        complaint_comment,
        user::{self, Role},
    },
    repositories::ComplaintFilter,
};
use tokio::sync::RwLock;

use crate::store::{CategoryStore, ComplaintStore, UserStore};

#[derive(Default)]
struct State {
    users: HashMap<String, user::Model>,
    complaints: HashMap<String, complaint::Model>,
    comments: HashMap<String, Vec<complaint_comment::Model>>,
    categories: HashMap<String, category::Model>,
}

/// Store keeping every table in memory behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(index: &str) -> AppError {
    AppError::Database(format!(
        "duplicate key value violates unique constraint \"{index}\""
    ))
}

fn page<T>(items: Vec<T>, limit: u64, offset: u64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

fn tally<K: Ord>(keys: impl Iterator<Item = K>) -> Vec<(K, u64)> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0_u64) += 1;
    }
    counts.into_iter().collect()
}

fn check_user_unique(state: &State, user: &user::Model) -> AppResult<()> {
    for other in state.users.values().filter(|u| u.id != user.id) {
        if other.email == user.email {
            return Err(duplicate("idx_user_email"));
        }
        if user.student_id.is_some() && other.student_id == user.student_id {
            return Err(duplicate("idx_user_student_id"));
        }
    }
    Ok(())
}

fn check_category_unique(state: &State, category: &category::Model) -> AppResult<()> {
    if state
        .categories
        .values()
        .any(|c| c.id != category.id && c.name == category.name)
    {
        return Err(duplicate("idx_category_name"));
    }
    Ok(())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: &str) -> AppResult<Option<user::Model>> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_users(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        let email = email.trim().to_lowercase();
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_student_id(
        &self,
        student_id: &str,
    ) -> AppResult<Option<user::Model>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.student_id.as_deref() == Some(student_id))
            .cloned())
    }

    async fn insert_user(&self, user: user::Model) -> AppResult<user::Model> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id) {
            return Err(duplicate("user_pkey"));
        }
        check_user_unique(&state, &user)?;
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn save_user(&self, user: user::Model) -> AppResult<user::Model> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user.id) {
            return Err(AppError::Database(format!("user {} vanished", user.id)));
        }
        check_user_unique(&state, &user)?;
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn list_users(
        &self,
        role: Option<Role>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        let state = self.state.read().await;
        let mut users: Vec<_> = state
            .users
            .values()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect();
        users.sort_by_key(|u| Reverse((u.created_at, u.id.clone())));
        Ok(page(users, limit, offset))
    }

    async fn count_users(&self, role: Option<Role>) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .count() as u64)
    }

    async fn active_staff(&self) -> AppResult<Vec<user::Model>> {
        let state = self.state.read().await;
        let mut staff: Vec<_> = state
            .users
            .values()
            .filter(|u| u.is_active && u.role.is_staff())
            .cloned()
            .collect();
        staff.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(staff)
    }

    async fn count_users_by_role(&self) -> AppResult<Vec<(Role, u64)>> {
        let state = self.state.read().await;
        Ok(tally(state.users.values().map(|u| u.role)))
    }

    async fn count_users_by_active(&self) -> AppResult<Vec<(bool, u64)>> {
        let state = self.state.read().await;
        Ok(tally(state.users.values().map(|u| u.is_active)))
    }
}

#[async_trait]
impl ComplaintStore for MemoryStore {
    async fn find_complaint(&self, id: &str) -> AppResult<Option<complaint::Model>> {
        Ok(self.state.read().await.complaints.get(id).cloned())
    }

    async fn insert_complaint(&self, complaint: complaint::Model) -> AppResult<complaint::Model> {
        let mut state = self.state.write().await;
        if state.complaints.contains_key(&complaint.id) {
            return Err(duplicate("complaint_pkey"));
        }
        state
            .complaints
            .insert(complaint.id.clone(), complaint.clone());
        Ok(complaint)
    }

    async fn save_complaint(&self, complaint: complaint::Model) -> AppResult<complaint::Model> {
        let mut state = self.state.write().await;
        if !state.complaints.contains_key(&complaint.id) {
            return Err(AppError::Database(format!(
                "complaint {} vanished",
                complaint.id
            )));
        }
        state
            .complaints
            .insert(complaint.id.clone(), complaint.clone());
        Ok(complaint)
    }

    async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<complaint::Model>> {
        let state = self.state.read().await;
        let mut complaints: Vec<_> = state
            .complaints
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        complaints.sort_by_key(|c| Reverse((c.created_at, c.id.clone())));
        Ok(page(complaints, limit, offset))
    }

    async fn count_complaints(&self, filter: &ComplaintFilter) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state.complaints.values().filter(|c| filter.matches(c)).count() as u64)
    }

    async fn comments(&self, complaint_id: &str) -> AppResult<Vec<complaint_comment::Model>> {
        let state = self.state.read().await;
        Ok(state.comments.get(complaint_id).cloned().unwrap_or_default())
    }

    async fn append_comment(
        &self,
        comment: complaint_comment::Model,
    ) -> AppResult<complaint_comment::Model> {
        let mut state = self.state.write().await;
        if !state.complaints.contains_key(&comment.complaint_id) {
            return Err(AppError::Database(format!(
                "comment references missing complaint {}",
                comment.complaint_id
            )));
        }
        state
            .comments
            .entry(comment.complaint_id.clone())
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }

    async fn count_by_status(&self) -> AppResult<Vec<(ComplaintStatus, u64)>> {
        let state = self.state.read().await;
        Ok(tally(state.complaints.values().map(|c| c.status)))
    }

    async fn count_by_category(&self) -> AppResult<Vec<(ComplaintCategory, u64)>> {
        let state = self.state.read().await;
        Ok(tally(state.complaints.values().map(|c| c.category)))
    }

    async fn count_by_priority(&self) -> AppResult<Vec<(Priority, u64)>> {
        let state = self.state.read().await;
        Ok(tally(state.complaints.values().map(|c| c.priority)))
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn find_category(&self, id: &str) -> AppResult<Option<category::Model>> {
        Ok(self.state.read().await.categories.get(id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<category::Model>> {
        let state = self.state.read().await;
        Ok(state.categories.values().find(|c| c.name == name).cloned())
    }

    async fn active_categories(&self) -> AppResult<Vec<category::Model>> {
        let state = self.state.read().await;
        let mut categories: Vec<_> = state
            .categories
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn count_categories(&self) -> AppResult<u64> {
        Ok(self.state.read().await.categories.len() as u64)
    }

    async fn insert_category(&self, category: category::Model) -> AppResult<category::Model> {
        let mut state = self.state.write().await;
        if state.categories.contains_key(&category.id) {
            return Err(duplicate("category_pkey"));
        }
        check_category_unique(&state, &category)?;
        state
            .categories
            .insert(category.id.clone(), category.clone());
        Ok(category)
    }

    async fn save_category(&self, category: category::Model) -> AppResult<category::Model> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&category.id) {
            return Err(AppError::Database(format!(
                "category {} vanished",
                category.id
            )));
        }
        check_category_unique(&state, &category)?;
        state
            .categories
            .insert(category.id.clone(), category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: &str) -> AppResult<bool> {
        Ok(self.state.write().await.categories.remove(id).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn test_user(id: &str, email: &str, student_id: Option<&str>) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: id.to_uppercase(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: if student_id.is_some() {
                Role::Student
            } else {
                Role::Technician
            },
            student_id: student_id.map(ToString::to_string),
            room_number: student_id.map(|_| "A-1".to_string()),
            phone: "555".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_complaint(id: &str, minutes_ago: i64) -> complaint::Model {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        complaint::Model {
            id: id.to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            category: ComplaintCategory::Mess,
            priority: Priority::Low,
            status: ComplaintStatus::Pending,
            student_id: "s1".to_string(),
            assigned_to: None,
            room_number: "A-1".to_string(),
            images: serde_json::json!([]),
            resolution: String::new(),
            resolved_at: None,
            resolved_by: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_email_and_student_id_are_unique() {
        let store = MemoryStore::new();
        store
            .insert_user(test_user("u1", "a@x.io", Some("S1")))
            .await
            .unwrap();

        assert!(
            store
                .insert_user(test_user("u2", "a@x.io", Some("S2")))
                .await
                .is_err()
        );
        assert!(
            store
                .insert_user(test_user("u3", "b@x.io", Some("S1")))
                .await
                .is_err()
        );
        // Staff have no student number; NULLs never collide
        store.insert_user(test_user("u4", "c@x.io", None)).await.unwrap();
        store.insert_user(test_user("u5", "d@x.io", None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_complaints_newest_first_and_paged() {
        let store = MemoryStore::new();
        for (id, age) in [("old", 30), ("new", 1), ("mid", 10)] {
            store.insert_complaint(test_complaint(id, age)).await.unwrap();
        }

        let filter = ComplaintFilter::default();
        let first = store.list_complaints(&filter, 2, 0).await.unwrap();
        let second = store.list_complaints(&filter, 2, 2).await.unwrap();

        let ids: Vec<_> = first.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid"]);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, "old");
        assert_eq!(store.count_complaints(&filter).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_comment_needs_existing_complaint() {
        let store = MemoryStore::new();
        let comment = complaint_comment::Model {
            id: "m1".to_string(),
            complaint_id: "missing".to_string(),
            user_id: "u1".to_string(),
            comment: "hello".to_string(),
            created_at: Utc::now(),
        };

        assert!(store.append_comment(comment).await.is_err());
        assert!(store.comments("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tally_by_status() {
        let store = MemoryStore::new();
        let mut resolved = test_complaint("c3", 0);
        resolved.status = ComplaintStatus::Resolved;
        store.insert_complaint(test_complaint("c1", 0)).await.unwrap();
        store.insert_complaint(test_complaint("c2", 0)).await.unwrap();
        store.insert_complaint(resolved).await.unwrap();

        assert_eq!(
            store.count_by_status().await.unwrap(),
            vec![(ComplaintStatus::Pending, 2), (ComplaintStatus::Resolved, 1)]
        );
    }
}
