//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use fixit_common::AppError;
use fixit_core::{
    AuthService, CategoryService, CategoryStoreRef, ComplaintService, ComplaintStoreRef,
    StatsService, UserService, UserStoreRef,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub complaint_service: ComplaintService,
    pub category_service: CategoryService,
    pub stats_service: StatsService,
}

impl AppState {
    /// Wire every service onto the given stores.
    #[must_use]
    pub fn new(
        users: UserStoreRef,
        complaints: ComplaintStoreRef,
        categories: CategoryStoreRef,
        auth: AuthService,
    ) -> Self {
        Self {
            user_service: UserService::new(users.clone(), auth),
            complaint_service: ComplaintService::new(complaints.clone(), users.clone()),
            category_service: CategoryService::new(categories),
            stats_service: StatsService::new(complaints, users),
        }
    }
}

/// Marker left on a request whose bearer token was refused.
#[derive(Debug, Clone, Copy)]
pub struct RejectedToken;

/// Authentication middleware.
///
/// Attaches the active user behind a valid `Bearer` token. A refused token
/// only marks the request, so public routes still answer; handlers that need
/// a user reject it via [`AuthUser`](crate::extractors::AuthUser). Store
/// failures end the request with the error's own response.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string);

    if let Some(token) = token {
        match state.user_service.authenticate(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(AppError::Unauthorized(_)) => {
                req.extensions_mut().insert(RejectedToken);
            }
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}
