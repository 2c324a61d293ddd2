//! Category endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use fixit_common::AppResult;
use fixit_core::{CreateCategoryInput, UpdateCategoryInput};
use fixit_db::entities::category;

use crate::{
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::ApiResponse,
};

/// Active categories. Public.
async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<category::Model>>> {
    let categories = state.category_service.list_active().await?;
    Ok(Json(categories))
}

async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateCategoryInput>,
) -> AppResult<ApiResponse> {
    let category = state.category_service.create(&auth.actor(), input).await?;

    ApiResponse::created("Category created successfully").with("category", category)
}

async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateCategoryInput>,
) -> AppResult<ApiResponse> {
    let category = state
        .category_service
        .update(&auth.actor(), &id, input)
        .await?;

    ApiResponse::ok("Category updated successfully").with("category", category)
}

async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse> {
    state.category_service.delete(&auth.actor(), &id).await?;

    Ok(ApiResponse::ok("Category deleted successfully"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", patch(update).delete(delete))
}
