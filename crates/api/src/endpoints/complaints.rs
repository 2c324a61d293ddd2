//! Complaint endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use fixit_common::AppResult;
use fixit_core::{
    AssignInput, CommentInput, ComplaintQuery, ComplaintStats, CreateComplaintInput,
    UpdateStatusInput, view::ComplaintView,
};
use serde_json::Value;

use crate::{
    extractors::{AuthUser, JsonBody, QueryParams},
    middleware::AppState,
    response::{ApiResponse, paged},
};

/// List complaints, newest first. Students only see their own.
async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ComplaintQuery>,
) -> AppResult<Json<Value>> {
    let page = state.complaint_service.list(&auth.actor(), query).await?;
    paged("complaints", page)
}

/// File a complaint as the caller.
async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateComplaintInput>,
) -> AppResult<ApiResponse> {
    let complaint = state.complaint_service.create(&auth.actor(), input).await?;

    ApiResponse::created("Complaint created successfully").with("complaint", complaint)
}

/// One complaint with its comment thread.
async fn show(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ComplaintView>> {
    let complaint = state.complaint_service.get(&auth.actor(), &id).await?;
    Ok(Json(complaint))
}

/// Move a complaint through its lifecycle.
async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateStatusInput>,
) -> AppResult<ApiResponse> {
    let complaint = state
        .complaint_service
        .transition(&auth.actor(), &id, input)
        .await?;

    ApiResponse::ok("Complaint status updated successfully").with("complaint", complaint)
}

/// Hand a complaint to a staff member.
async fn assign(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<AssignInput>,
) -> AppResult<ApiResponse> {
    let complaint = state
        .complaint_service
        .assign(&auth.actor(), &id, input)
        .await?;

    ApiResponse::ok("Complaint assigned successfully").with("complaint", complaint)
}

/// Append to a complaint's comment thread.
async fn add_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<CommentInput>,
) -> AppResult<ApiResponse> {
    let complaint = state
        .complaint_service
        .add_comment(&auth.actor(), &id, input)
        .await?;

    ApiResponse::ok("Comment added successfully").with("complaint", complaint)
}

/// Counts by status, category and priority.
async fn overview(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ComplaintStats>> {
    let stats = state.stats_service.overview(&auth.actor()).await?;
    Ok(Json(stats))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats/overview", get(overview))
        .route("/{id}", get(show))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/assign", patch(assign))
        .route("/{id}/comments", post(add_comment))
}
