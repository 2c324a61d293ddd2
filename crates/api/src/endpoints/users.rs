//! User administration and profile endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use fixit_common::AppResult;
use fixit_core::{SetActiveInput, UpdateProfileInput, UserQuery, UserStats, view::StaffRef};
use serde_json::Value;

use crate::{
    extractors::{AuthUser, JsonBody, QueryParams},
    middleware::AppState,
    response::{ApiResponse, paged},
};

/// List users, newest first.
async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UserQuery>,
) -> AppResult<Json<Value>> {
    let page = state.user_service.list(&auth.actor(), query).await?;
    paged("users", page)
}

/// Active staff that complaints can be assigned to.
async fn staff(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<StaffRef>>> {
    let staff = state.user_service.list_staff(&auth.actor()).await?;
    Ok(Json(staff))
}

/// Update the caller's own profile.
async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UpdateProfileInput>,
) -> AppResult<ApiResponse> {
    let user = state
        .user_service
        .update_profile(&auth.actor(), input)
        .await?;

    ApiResponse::ok("Profile updated successfully").with("user", user)
}

/// Activate or deactivate an account.
async fn set_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<SetActiveInput>,
) -> AppResult<ApiResponse> {
    let user = state
        .user_service
        .set_active(&auth.actor(), &id, input)
        .await?;

    ApiResponse::ok("User status updated successfully").with("user", user)
}

/// Counts by role and active flag.
async fn overview(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<UserStats>> {
    let stats = state.stats_service.user_overview(&auth.actor()).await?;
    Ok(Json(stats))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/staff", get(staff))
        .route("/profile", patch(update_profile))
        .route("/stats/overview", get(overview))
        .route("/{id}/status", patch(set_status))
}
