//! User data models and API request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a user record joined with its role name.
///
/// # Database Table
///
/// Maps to the `users` table; `role_name` comes from `roles.name` and is
/// `None` when the user has no role.
///
/// # Password Storage
///
/// `password_hash` is an Argon2 PHC string. Users without one cannot log in.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub role_id: Option<i64>,
    pub role_name: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a user.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Salim",
///   "email": "salim@example.com",
///   "phone": "+968 9000 0000",
///   "password": "s3cret-pass",
///   "role": "accountant"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// Response body for user endpoints. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role_name,
            active: user.active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned once at login. The token is not stored and cannot be recovered.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}
