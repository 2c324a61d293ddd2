//! Category entity.
//!
//! Presentation taxonomy for the dashboard. Complaints carry their own closed
//! category enum and never reference these rows.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Icon used when a category is created without one.
pub const DEFAULT_ICON: &str = "fas fa-tools";

/// Colour used when a category is created without one.
pub const DEFAULT_COLOR: &str = "#007bff";

/// Category model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique category ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Unique category name.
    #[sea_orm(unique)]
    pub name: String,

    /// Optional description.
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Icon class or URL.
    pub icon: String,

    /// Display colour.
    pub color: String,

    /// Inactive categories are hidden from the public list.
    pub is_active: bool,

    /// When the category was created.
    pub created_at: DateTime<Utc>,

    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
