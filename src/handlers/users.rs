//! User administration (admin only).
//!
//! - POST /api/v1/users
//! - GET /api/v1/users
//! - PATCH /api/v1/users/{id}/active
//! - GET /api/v1/roles

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        role::{ADMIN_ONLY, RoleRecord},
        user::{CreateUserRequest, SetActiveRequest, UserResponse},
    },
    services::{audit_service, user_service},
};

/// Create a user.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Salim",
///   "email": "salim@example.com",
///   "password": "s3cret-pass",
///   "role": "accountant"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: The user, without password hash
/// - **Error (400)**: Bad email, short password, unknown role
/// - **Error (409)**: Email already in use
pub async fn create_user(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    auth.require(ADMIN_ONLY)?;

    let user = user_service::create_user(&pool, request).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "create",
        "User",
        Some(user.id),
        serde_json::json!({ "email": user.email, "role": user.role_name }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn list_users(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    auth.require(ADMIN_ONLY)?;

    let users = user_service::list_users(&pool).await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Activate or deactivate a user. Admins cannot deactivate themselves.
pub async fn set_active(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<i64>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth.require(ADMIN_ONLY)?;

    if user_id == auth.user_id && !request.active {
        return Err(AppError::InvalidRequest(
            "You cannot deactivate your own account".to_string(),
        ));
    }

    let user = user_service::set_active(&pool, user_id, request.active).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        if request.active { "activate" } else { "deactivate" },
        "User",
        Some(user.id),
        serde_json::json!({}),
    )
    .await;

    Ok(Json(user.into()))
}

pub async fn list_roles(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<RoleRecord>>, AppError> {
    auth.require(ADMIN_ONLY)?;

    Ok(Json(user_service::list_roles(&pool).await?))
}
