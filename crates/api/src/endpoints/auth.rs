//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use fixit_common::AppResult;
use fixit_core::{LoginInput, RegisterInput};
use fixit_db::entities::user;

use crate::{
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::ApiResponse,
};

/// Create an account and sign it in.
async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterInput>,
) -> AppResult<ApiResponse> {
    let outcome = state.user_service.register(input).await?;

    ApiResponse::created("User registered successfully")
        .with("token", outcome.token)?
        .with("user", outcome.user)
}

/// Exchange credentials for a token.
async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> AppResult<ApiResponse> {
    let outcome = state.user_service.login(input).await?;

    ApiResponse::ok("Login successful")
        .with("token", outcome.token)?
        .with("user", outcome.user)
}

/// The signed-in user.
async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<user::Model>> {
    let user = state.user_service.me(&auth.actor()).await?;
    Ok(Json(user))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}
