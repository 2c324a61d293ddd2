//! API endpoints.

mod auth;
mod categories;
mod complaints;
mod users;

use axum::{Json, Router, http::StatusCode, middleware, response::IntoResponse};
use serde_json::json;

use crate::middleware::{AppState, auth_middleware};

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/complaints", complaints::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
}

/// The full application: `/api` routes behind token authentication, with a
/// JSON 404 for everything else.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
}
