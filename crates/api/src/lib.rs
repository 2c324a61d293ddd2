//! HTTP API layer for FixIt.
//!
//! This crate provides the REST API under `/api`:
//!
//! - **Endpoints**: auth, complaints, users and categories
//! - **Extractors**: authentication and body parsing that answer in the API's error shape
//! - **Middleware**: bearer token authentication
//!
//! Built on Axum 0.8. Transport layers (CORS, tracing, timeouts) are added by
//! the server binary.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{app, router};
pub use middleware::AppState;
