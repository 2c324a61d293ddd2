//! API integration tests.
//!
//! Drive the full router (auth middleware, fallback, handlers) over the
//! in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use fixit_api::{AppState, app};
use fixit_common::Config;
use async_trait::async_trait;
use fixit_common::{AppError, AppResult};
use fixit_core::{AuthService, MemoryStore, UserStore, UserStoreRef};
use fixit_db::entities::user::{self, Role};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    store: Arc<MemoryStore>,
    auth: AuthService,
    state: AppState,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_users(|store| store as UserStoreRef).await
    }

    /// Same app, with user lookups routed through `users`.
    async fn with_users(users: impl FnOnce(Arc<MemoryStore>) -> UserStoreRef) -> Self {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthService::new(&Config::for_testing("integration-secret").auth);
        let state = AppState::new(users(store.clone()), store.clone(), store.clone(), auth.clone());
        state.category_service.seed_defaults().await.unwrap();

        Self { store, auth, state }
    }

    fn router(&self) -> Router {
        app(self.state.clone())
    }

    /// Insert a user and return a bearer token for it.
    async fn user(&self, id: &str, role: Role) -> String {
        let student = role == Role::Student;
        let user = self
            .store
            .insert_user(user::Model {
                id: id.to_string(),
                name: format!("User {id}"),
                email: format!("{id}@hostel.test"),
                password_hash: "unused".to_string(),
                role,
                student_id: student.then(|| format!("STU-{id}")),
                room_number: student.then(|| "B-12".to_string()),
                phone: "555-0100".to_string(),
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        self.auth.issue(&user).unwrap()
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn file_complaint(&self, token: &str, title: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/complaints",
                Some(token),
                Some(json!({
                    "title": title,
                    "description": "Nothing works",
                    "category": "internet",
                    "roomNumber": "B-12"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["complaint"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = TestApp::new().await;

    let (status, body) = app.send("GET", "/api/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Route not found" }));
}

#[tokio::test]
async fn test_missing_or_bad_token_is_401() {
    let app = TestApp::new().await;

    let (status, body) = app.send("GET", "/api/complaints", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token, authorization denied");

    let (status, body) = app
        .send("GET", "/api/auth/me", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is not valid");

    // Public routes ignore a refused token
    let (status, _) = app
        .send("GET", "/api/categories", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

/// Delegates to the memory store but cannot load users by id.
struct UnreachableUsers(Arc<MemoryStore>);

#[async_trait]
impl UserStore for UnreachableUsers {
    async fn find_user(&self, _id: &str) -> AppResult<Option<user::Model>> {
        Err(AppError::Database("connection refused".to_string()))
    }

    async fn find_users(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        self.0.find_users(ids).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        self.0.find_user_by_email(email).await
    }

    async fn find_user_by_student_id(
        &self,
        student_id: &str,
    ) -> AppResult<Option<user::Model>> {
        self.0.find_user_by_student_id(student_id).await
    }

    async fn insert_user(&self, user: user::Model) -> AppResult<user::Model> {
        self.0.insert_user(user).await
    }

    async fn save_user(&self, user: user::Model) -> AppResult<user::Model> {
        self.0.save_user(user).await
    }

    async fn list_users(
        &self,
        role: Option<Role>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        self.0.list_users(role, limit, offset).await
    }

    async fn count_users(&self, role: Option<Role>) -> AppResult<u64> {
        self.0.count_users(role).await
    }

    async fn active_staff(&self) -> AppResult<Vec<user::Model>> {
        self.0.active_staff().await
    }

    async fn count_users_by_role(&self) -> AppResult<Vec<(Role, u64)>> {
        self.0.count_users_by_role().await
    }

    async fn count_users_by_active(&self) -> AppResult<Vec<(bool, u64)>> {
        self.0.count_users_by_active().await
    }
}

#[tokio::test]
async fn test_store_failure_during_auth_is_500() {
    let app = TestApp::with_users(|store| Arc::new(UnreachableUsers(store)) as UserStoreRef).await;
    let admin = app.user("a1", Role::Admin).await;

    let (status, body) = app
        .send("GET", "/api/complaints", Some(&admin), None)
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Server error" }));
}

#[tokio::test]
async fn test_register_login_me() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Asha Rao",
                "email": "asha@example.com",
                "password": "secret123",
                "phone": "555-0101",
                "studentId": "STU-77",
                "roomNumber": "A-101"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["studentId"], "STU-77");
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "asha@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app.send("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "asha@example.com");
    assert_eq!(body["role"], "student");
}

#[tokio::test]
async fn test_register_validation_shape() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "X", "email": "bad", "password": "123", "phone": "1" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<_> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["email", "password", "roomNumber", "studentId"]);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = TestApp::new().await;
    let token = app.user("s1", Role::Student).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/complaints")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_complaint_visibility() {
    let app = TestApp::new().await;
    let owner = app.user("s1", Role::Student).await;
    let other = app.user("s2", Role::Student).await;
    let warden = app.user("w1", Role::Warden).await;
    let id = app.file_complaint(&owner, "Wifi down").await;
    app.file_complaint(&other, "Other's wifi").await;

    let uri = format!("/api/complaints/{id}");
    let (status, body) = app.send("GET", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["priority"], "medium");
    assert_eq!(body["student"]["id"], "s1");
    assert_eq!(body["comments"], json!([]));

    let (status, body) = app.send("GET", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");

    let (status, body) = app
        .send("GET", "/api/complaints", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["totalPages"], 1);
    assert!(body["complaints"][0].get("comments").is_none());

    let (_, body) = app
        .send("GET", "/api/complaints?limit=1&page=2", Some(&warden), None)
        .await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["complaints"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .send("GET", "/api/complaints/missing", Some(&warden), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_lifecycle() {
    let app = TestApp::new().await;
    let student = app.user("s1", Role::Student).await;
    let tech = app.user("t1", Role::Technician).await;
    let id = app.file_complaint(&student, "Broken fan").await;
    let uri = format!("/api/complaints/{id}/status");

    let (status, _) = app
        .send("PATCH", &uri, Some(&student), Some(json!({ "status": "resolved" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            "PATCH",
            &uri,
            Some(&tech),
            Some(json!({ "status": "resolved", "resolution": "Replaced fan" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Complaint status updated successfully");
    assert_eq!(body["complaint"]["status"], "resolved");
    assert_eq!(body["complaint"]["resolution"], "Replaced fan");
    assert_eq!(body["complaint"]["resolvedBy"]["id"], "t1");
    assert!(body["complaint"]["resolvedAt"].is_string());

    let (status, body) = app
        .send("PATCH", &uri, Some(&tech), Some(json!({ "status": "pending" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Status cannot be changed after resolution/closure"
    );

    let (status, body) = app
        .send("PATCH", &uri, Some(&tech), Some(json!({ "status": "done" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "status");
}

#[tokio::test]
async fn test_assignment() {
    let app = TestApp::new().await;
    let student = app.user("s1", Role::Student).await;
    let admin = app.user("a1", Role::Admin).await;
    app.user("t1", Role::Technician).await;
    let id = app.file_complaint(&student, "Leaky tap").await;
    let uri = format!("/api/complaints/{id}/assign");

    let (status, body) = app
        .send("PATCH", &uri, Some(&admin), Some(json!({ "assignedTo": "s1" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid user for assignment");

    let (status, body) = app
        .send("PATCH", &uri, Some(&admin), Some(json!({ "assignedTo": "t1" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Complaint assigned successfully");
    assert_eq!(body["complaint"]["status"], "in_progress");
    assert_eq!(body["complaint"]["assignedTo"]["id"], "t1");
    assert_eq!(body["complaint"]["assignedTo"]["role"], "technician");

    let (status, _) = app
        .send("PATCH", &uri, Some(&admin), Some(json!({ "assignedTo": "ghost" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_thread() {
    let app = TestApp::new().await;
    let owner = app.user("s1", Role::Student).await;
    let other = app.user("s2", Role::Student).await;
    let warden = app.user("w1", Role::Warden).await;
    let id = app.file_complaint(&owner, "Cold water only").await;
    let uri = format!("/api/complaints/{id}/comments");

    let (status, _) = app
        .send("POST", &uri, Some(&other), Some(json!({ "comment": "me too" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.send("POST", &uri, Some(&owner), Some(json!({ "comment": "first" })))
        .await;
    let (status, body) = app
        .send("POST", &uri, Some(&warden), Some(json!({ "comment": "on it" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment added successfully");

    let thread = body["complaint"]["comments"].as_array().unwrap();
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0]["comment"], "first");
    assert_eq!(thread[0]["user"]["name"], "User s1");
    assert_eq!(thread[1]["user"]["role"], "warden");

    let (status, body) = app
        .send("POST", &uri, Some(&owner), Some(json!({ "comment": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Comment is required");
}

#[tokio::test]
async fn test_stats_overview() {
    let app = TestApp::new().await;
    let student = app.user("s1", Role::Student).await;
    let admin = app.user("a1", Role::Admin).await;
    app.file_complaint(&student, "one").await;
    app.file_complaint(&student, "two").await;
    let resolved = app.file_complaint(&student, "three").await;
    app.send(
        "PATCH",
        &format!("/api/complaints/{resolved}/status"),
        Some(&admin),
        Some(json!({ "status": "resolved" })),
    )
    .await;

    let (status, _) = app
        .send("GET", "/api/complaints/stats/overview", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send("GET", "/api/complaints/stats/overview", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["statusStats"],
        json!({ "pending": 2, "in_progress": 0, "resolved": 1, "closed": 0 })
    );
    assert_eq!(body["categoryStats"]["internet"], 3);
    assert_eq!(body["priorityStats"]["medium"], 3);

    let (status, body) = app
        .send("GET", "/api/users/stats/overview", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roleStats"]["student"], 1);
    assert_eq!(body["roleStats"]["admin"], 1);
}

#[tokio::test]
async fn test_user_administration() {
    let app = TestApp::new().await;
    let student = app.user("s1", Role::Student).await;
    let admin = app.user("a1", Role::Admin).await;
    app.user("t1", Role::Technician).await;

    let (status, _) = app.send("GET", "/api/users", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send("GET", "/api/users?role=technician", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["users"][0]["id"], "t1");

    let (status, body) = app.send("GET", "/api/users/staff", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app
        .send(
            "PATCH",
            "/api/users/profile",
            Some(&student),
            Some(json!({ "roomNumber": "C-3" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["roomNumber"], "C-3");

    let (status, body) = app
        .send(
            "PATCH",
            "/api/users/s1/status",
            Some(&admin),
            Some(json!({ "isActive": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["isActive"], false);

    let (status, body) = app.send("GET", "/api/auth/me", Some(&student), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is not valid");
}

#[tokio::test]
async fn test_categories() {
    let app = TestApp::new().await;
    let student = app.user("s1", Role::Student).await;
    let admin = app.user("a1", Role::Admin).await;

    let (status, body) = app.send("GET", "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 7);
    assert_eq!(body[0]["name"], "electricity");

    let laundry = json!({ "name": "laundry", "description": "Washing machines" });
    let (status, _) = app
        .send("POST", "/api/categories", Some(&student), Some(laundry.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send("POST", "/api/categories", Some(&admin), Some(laundry.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Category created successfully");
    let id = body["category"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send("POST", "/api/categories", Some(&admin), Some(laundry))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Category with this name already exists");

    let uri = format!("/api/categories/{id}");
    let (status, body) = app
        .send("PATCH", &uri, Some(&admin), Some(json!({ "isActive": false })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["isActive"], false);

    let (status, body) = app.send("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted successfully");

    let (status, _) = app.send("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_accepts_null_images() {
    let app = TestApp::new().await;
    let student = app.user("s1", Role::Student).await;

    let (status, body) = app
        .send(
            "POST",
            "/api/complaints",
            Some(&student),
            Some(json!({
                "title": "Mess food cold",
                "description": "Dinner served cold all week",
                "category": "mess",
                "priority": "high",
                "roomNumber": "B-12",
                "images": null
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["complaint"]["images"], json!([]));
    assert_eq!(body["complaint"]["priority"], "high");
}
