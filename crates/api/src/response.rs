//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fixit_common::{AppError, AppResult};
use fixit_core::services::Page;
use serde::Serialize;
use serde_json::{Map, Value};

/// Message envelope used by mutations: `{ "message": ..., "<key>": ... }`.
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    body: Map<String, Value>,
}

impl ApiResponse {
    /// `200` with a message.
    pub fn ok(message: &str) -> Self {
        Self::with_status(StatusCode::OK, message)
    }

    /// `201` with a message.
    pub fn created(message: &str) -> Self {
        Self::with_status(StatusCode::CREATED, message)
    }

    fn with_status(status: StatusCode, message: &str) -> Self {
        let mut body = Map::new();
        body.insert("message".to_string(), Value::String(message.to_string()));
        Self { status, body }
    }

    /// Add a field next to the message.
    pub fn with(mut self, key: &str, value: impl Serialize) -> AppResult<Self> {
        self.body.insert(key.to_string(), to_value(value)?);
        Ok(self)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(Value::Object(self.body))).into_response()
    }
}

/// Listing envelope: `{ "<key>": [...], "totalPages", "currentPage", "total" }`.
pub fn paged<T: Serialize>(key: &str, page: Page<T>) -> AppResult<Json<Value>> {
    let mut body = match to_value(&page)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    body.insert(key.to_string(), to_value(page.items)?);
    Ok(Json(Value::Object(body)))
}

fn to_value(value: impl Serialize) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize response: {e}")))
}
