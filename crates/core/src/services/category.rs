//! Category service.

use chrono::Utc;
use fixit_common::{AppError, AppResult, IdGenerator};
use fixit_db::entities::category::{self, DEFAULT_COLOR, DEFAULT_ICON};
use serde::Deserialize;
use validator::Validate;

use crate::{
    policy::{self, Action, Actor},
    store::CategoryStoreRef,
    validation,
};

const NAME_TAKEN: &str = "Category with this name already exists";

/// Seeded into an empty category table: `(name, description, icon, color)`.
pub const DEFAULT_CATEGORIES: [(&str, &str, &str, &str); 7] = [
    ("mess", "Mess related complaints", "fas fa-utensils", "#ff9800"),
    ("internet", "Internet connectivity issues", "fas fa-wifi", "#2196f3"),
    ("water", "Water supply issues", "fas fa-tint", "#00bcd4"),
    ("electricity", "Electrical problems", "fas fa-bolt", "#ffeb3b"),
    ("room_maintenance", "Room maintenance issues", "fas fa-home", "#4caf50"),
    ("security", "Security concerns", "fas fa-shield-alt", "#f44336"),
    ("other", "Other issues", "fas fa-tools", "#9e9e9e"),
];

/// Input for creating a category.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateCategoryInput {
    #[validate(custom(function = "validation::not_blank", message = "Category name is required"))]
    pub name: String,

    pub description: Option<String>,

    pub icon: Option<String>,

    pub color: Option<String>,
}

/// Partial category update.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCategoryInput {
    #[validate(custom(function = "validation::not_blank", message = "Category name cannot be empty"))]
    pub name: Option<String>,

    pub description: Option<String>,

    pub icon: Option<String>,

    pub color: Option<String>,

    pub is_active: Option<bool>,
}

/// Category service for business logic.
#[derive(Clone)]
pub struct CategoryService {
    categories: CategoryStoreRef,
    id_gen: IdGenerator,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub const fn new(categories: CategoryStoreRef) -> Self {
        Self {
            categories,
            id_gen: IdGenerator::new(),
        }
    }

    /// Active categories sorted by name. Open to anyone signed in.
    pub async fn list_active(&self) -> AppResult<Vec<category::Model>> {
        self.categories.active_categories().await
    }

    /// Create a category.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateCategoryInput,
    ) -> AppResult<category::Model> {
        policy::authorize(actor, Action::ManageCategories, None)?;
        input.validate()?;

        let name = input.name.trim().to_string();
        self.ensure_name_free(&name, None).await?;

        let now = Utc::now();
        let model = category::Model {
            id: self.id_gen.generate(),
            name,
            description: validation::trimmed(input.description.as_deref()),
            icon: validation::trimmed(input.icon.as_deref())
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
            color: validation::trimmed(input.color.as_deref())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let category = self.categories.insert_category(model).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Update a category. Absent fields are left alone.
    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        input: UpdateCategoryInput,
    ) -> AppResult<category::Model> {
        policy::authorize(actor, Action::ManageCategories, None)?;
        input.validate()?;

        let mut category = self.load(id).await?;

        if let Some(name) = validation::trimmed(input.name.as_deref()) {
            self.ensure_name_free(&name, Some(&category.id)).await?;
            category.name = name;
        }
        if let Some(description) = input.description {
            category.description = validation::trimmed(Some(description.as_str()));
        }
        if let Some(icon) = validation::trimmed(input.icon.as_deref()) {
            category.icon = icon;
        }
        if let Some(color) = validation::trimmed(input.color.as_deref()) {
            category.color = color;
        }
        if let Some(is_active) = input.is_active {
            category.is_active = is_active;
        }
        category.updated_at = Utc::now();

        let category = self.categories.save_category(category).await?;
        tracing::info!(category_id = %category.id, "Category updated");
        Ok(category)
    }

    /// Delete a category.
    pub async fn delete(&self, actor: &Actor, id: &str) -> AppResult<()> {
        policy::authorize(actor, Action::ManageCategories, None)?;

        if !self.categories.delete_category(id).await? {
            return Err(not_found());
        }
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }

    /// Insert the default categories when none exist. Returns how many were added.
    pub async fn seed_defaults(&self) -> AppResult<usize> {
        if self.categories.count_categories().await? > 0 {
            return Ok(0);
        }

        let now = Utc::now();
        for (name, description, icon, color) in DEFAULT_CATEGORIES {
            self.categories
                .insert_category(category::Model {
                    id: self.id_gen.generate(),
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    icon: icon.to_string(),
                    color: color.to_string(),
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                })
                .await?;
        }

        tracing::info!(count = DEFAULT_CATEGORIES.len(), "Seeded default categories");
        Ok(DEFAULT_CATEGORIES.len())
    }

    async fn ensure_name_free(&self, name: &str, own_id: Option<&str>) -> AppResult<()> {
        match self.categories.find_category_by_name(name).await? {
            Some(existing) if Some(existing.id.as_str()) != own_id => {
                Err(AppError::BadRequest(NAME_TAKEN.to_string()))
            }
            _ => Ok(()),
        }
    }

    async fn load(&self, id: &str) -> AppResult<category::Model> {
        self.categories
            .find_category(id)
            .await?
            .ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Category not found".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        memory::MemoryStore,
        test_support::{actor, seed_user, store},
    };
    use fixit_db::entities::user::Role;
    use std::sync::Arc;

    fn service(store: &Arc<MemoryStore>) -> CategoryService {
        CategoryService::new(store.clone())
    }

    fn named(name: &str) -> CreateCategoryInput {
        CreateCategoryInput {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_seed_defaults_once() {
        let store = store();
        let svc = service(&store);

        assert_eq!(svc.seed_defaults().await.unwrap(), 7);
        assert_eq!(svc.seed_defaults().await.unwrap(), 0);

        let listed = svc.list_active().await.unwrap();
        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "electricity",
                "internet",
                "mess",
                "other",
                "room_maintenance",
                "security",
                "water"
            ]
        );
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let store = store();
        let admin = seed_user(&store, "a1", Role::Admin).await;

        let created = service(&store)
            .create(&actor(&admin), named("  laundry "))
            .await
            .unwrap();

        assert_eq!(created.name, "laundry");
        assert_eq!(created.icon, DEFAULT_ICON);
        assert_eq!(created.color, DEFAULT_COLOR);
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_and_blank() {
        let store = store();
        let admin = seed_user(&store, "a1", Role::Admin).await;
        let svc = service(&store);
        svc.create(&actor(&admin), named("laundry")).await.unwrap();

        let duplicate = svc.create(&actor(&admin), named("laundry")).await;
        assert!(matches!(duplicate, Err(AppError::BadRequest(msg)) if msg == NAME_TAKEN));

        let blank = svc.create(&actor(&admin), named("   ")).await;
        assert!(matches!(blank, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_non_staff_cannot_manage() {
        let store = store();
        let student = seed_user(&store, "s1", Role::Student).await;

        let result = service(&store).create(&actor(&student), named("x")).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_and_hide() {
        let store = store();
        let warden = seed_user(&store, "w1", Role::Warden).await;
        let svc = service(&store);
        let created = svc.create(&actor(&warden), named("laundry")).await.unwrap();

        let renamed = svc
            .update(
                &actor(&warden),
                &created.id,
                UpdateCategoryInput {
                    name: Some("laundry room".to_string()),
                    color: Some("#123456".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "laundry room");
        assert_eq!(renamed.color, "#123456");
        assert_eq!(renamed.icon, DEFAULT_ICON);

        svc.update(
            &actor(&warden),
            &created.id,
            UpdateCategoryInput {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(svc.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename_onto_other_name_fails() {
        let store = store();
        let admin = seed_user(&store, "a1", Role::Admin).await;
        let svc = service(&store);
        svc.create(&actor(&admin), named("mess")).await.unwrap();
        let water = svc.create(&actor(&admin), named("water")).await.unwrap();

        let result = svc
            .update(
                &actor(&admin),
                &water.id,
                UpdateCategoryInput {
                    name: Some("mess".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let same_name = svc
            .update(
                &actor(&admin),
                &water.id,
                UpdateCategoryInput {
                    name: Some("water".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(same_name.is_ok());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store();
        let admin = seed_user(&store, "a1", Role::Admin).await;
        let svc = service(&store);
        let created = svc.create(&actor(&admin), named("laundry")).await.unwrap();

        svc.delete(&actor(&admin), &created.id).await.unwrap();

        assert!(matches!(
            svc.delete(&actor(&admin), &created.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
