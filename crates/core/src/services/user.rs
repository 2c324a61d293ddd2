//! User service.
//!
//! Registration, sign-in, profiles and the staff-only account admin.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use fixit_common::{AppError, AppResult, FieldError, IdGenerator};
use fixit_db::entities::user::{self, Role};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{AuthService, INVALID_TOKEN_MESSAGE, Page, PageRequest};
use crate::{
    policy::{self, Action, Actor},
    store::UserStoreRef,
    validation,
    view::StaffRef,
};

const USER_EXISTS: &str = "User already exists";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Input for registering an account.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterInput {
    #[validate(custom(function = "validation::not_blank", message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Please include a valid email"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(custom(function = "validation::not_blank", message = "Phone number is required"))]
    pub phone: String,

    #[validate(custom(function = "validation::role"))]
    pub role: Option<String>,

    pub student_id: Option<String>,

    pub room_number: Option<String>,
}

/// Input for signing in.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginInput {
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Partial profile update. Supplied fields must not be blank.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileInput {
    #[validate(custom(function = "validation::not_blank", message = "Name cannot be empty"))]
    pub name: Option<String>,

    #[validate(custom(function = "validation::not_blank", message = "Phone cannot be empty"))]
    pub phone: Option<String>,

    #[validate(custom(function = "validation::not_blank", message = "Room number cannot be empty"))]
    pub room_number: Option<String>,
}

/// Input for toggling an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveInput {
    pub is_active: bool,
}

/// User listing filter and page position.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserQuery {
    #[validate(custom(function = "validation::role"))]
    pub role: Option<String>,

    pub page: Option<u64>,

    pub limit: Option<u64>,
}

/// Token plus the signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct AuthOutcome {
    pub token: String,
    pub user: user::Model,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    users: UserStoreRef,
    auth: AuthService,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(users: UserStoreRef, auth: AuthService) -> Self {
        Self {
            users,
            auth,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register an account and sign it in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthOutcome> {
        let mut errors = match input.validate() {
            Ok(()) => Vec::new(),
            Err(e) => match AppError::from(e) {
                AppError::Validation(fields) => fields,
                other => return Err(other),
            },
        };

        let role = input
            .role
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or_default();
        let student_id = validation::trimmed(input.student_id.as_deref());
        let room_number = validation::trimmed(input.room_number.as_deref());
        if role == Role::Student {
            if student_id.is_none() {
                errors.push(FieldError::new("studentId", "Student ID is required"));
            }
            if room_number.is_none() {
                errors.push(FieldError::new("roomNumber", "Room number is required"));
            }
        }
        if !errors.is_empty() {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            return Err(AppError::Validation(errors));
        }

        let email = input.email.trim().to_lowercase();
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::BadRequest(USER_EXISTS.to_string()));
        }
        if let Some(sid) = &student_id {
            if self.users.find_user_by_student_id(sid).await?.is_some() {
                return Err(AppError::BadRequest(USER_EXISTS.to_string()));
            }
        }

        let now = Utc::now();
        let model = user::Model {
            id: self.id_gen.generate(),
            name: input.name.trim().to_string(),
            email,
            password_hash: hash_password(&input.password)?,
            role,
            student_id,
            room_number,
            phone: input.phone.trim().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let user = self.users.insert_user(model).await?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");

        let token = self.auth.issue(&user)?;
        Ok(AuthOutcome { token, user })
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthOutcome> {
        input.validate()?;

        let user = self
            .users
            .find_user_by_email(&input.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        if !user.is_active {
            return Err(AppError::Unauthorized("Account is deactivated".to_string()));
        }

        tracing::info!(user_id = %user.id, "User signed in");
        let token = self.auth.issue(&user)?;
        Ok(AuthOutcome { token, user })
    }

    /// Resolve a bearer token to an active user.
    ///
    /// A bad signature, an expired token, a deleted account and a
    /// deactivated one all fail with `Unauthorized("Token is not valid")`.
    /// Store failures propagate unchanged.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.auth.verify(token)?;

        self.users
            .find_user(&claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()))
    }

    /// The caller's own profile.
    pub async fn me(&self, actor: &Actor) -> AppResult<user::Model> {
        self.load(&actor.id).await
    }

    /// Update name, phone or room number of the caller.
    pub async fn update_profile(
        &self,
        actor: &Actor,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let mut user = self.load(&actor.id).await?;
        if let Some(name) = validation::trimmed(input.name.as_deref()) {
            user.name = name;
        }
        if let Some(phone) = validation::trimmed(input.phone.as_deref()) {
            user.phone = phone;
        }
        if let Some(room) = validation::trimmed(input.room_number.as_deref()) {
            user.room_number = Some(room);
        }
        user.updated_at = Utc::now();

        let user = self.users.save_user(user).await?;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Activate or deactivate an account.
    pub async fn set_active(
        &self,
        actor: &Actor,
        id: &str,
        input: SetActiveInput,
    ) -> AppResult<user::Model> {
        policy::authorize(actor, Action::ManageUsers, None)?;

        let mut user = self.load(id).await?;
        user.is_active = input.is_active;
        user.updated_at = Utc::now();

        let user = self.users.save_user(user).await?;
        tracing::info!(
            user_id = %user.id,
            actor = %actor.id,
            is_active = user.is_active,
            "User status changed"
        );
        Ok(user)
    }

    /// Newest-first listing of accounts.
    pub async fn list(&self, actor: &Actor, query: UserQuery) -> AppResult<Page<user::Model>> {
        policy::authorize(actor, Action::ManageUsers, None)?;
        query.validate()?;

        let role = query.role.as_deref().and_then(Role::parse);
        let request = PageRequest::new(query.page, query.limit);

        let users = self
            .users
            .list_users(role, request.limit, request.offset())
            .await?;
        let total = self.users.count_users(role).await?;
        Ok(Page::new(users, total, request))
    }

    /// Active staff a complaint can be assigned to.
    pub async fn list_staff(&self, actor: &Actor) -> AppResult<Vec<StaffRef>> {
        policy::authorize(actor, Action::ManageUsers, None)?;

        let staff = self.users.active_staff().await?;
        Ok(staff.iter().map(StaffRef::from).collect())
    }

    async fn load(&self, id: &str) -> AppResult<user::Model> {
        self.users
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
