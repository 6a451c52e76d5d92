//! User administration and bootstrap.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        role::{Role, RoleRecord},
        user::{CreateUserRequest, User},
    },
    services::auth_service,
};

/// Role names seeded on a fresh database. `staff` is stored, `employee` is meant.
pub const DEFAULT_ROLES: [&str; 4] = ["admin", "staff", "accountant", "customer"];

const USER_SELECT: &str = r#"
    SELECT u.id, u.name, u.email, u.phone, u.password_hash, u.role_id,
           r.name AS role_name, u.active, u.created_at
    FROM users u
    LEFT JOIN roles r ON r.id = u.role_id
"#;

pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE lower(u.email) = lower($1)"))
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &DbPool, user_id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn list_users(pool: &DbPool) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(&format!("{USER_SELECT} ORDER BY u.created_at DESC"))
        .fetch_all(pool)
        .await?;

    Ok(users)
}

pub async fn list_roles(pool: &DbPool) -> Result<Vec<RoleRecord>, AppError> {
    let roles = sqlx::query_as::<_, RoleRecord>("SELECT id, name FROM roles ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(roles)
}

/// Find the stored role row for a requested role name.
///
/// Matching goes through canonical names, so asking for `employee` finds the
/// seeded `staff` row.
pub async fn resolve_role(pool: &DbPool, requested: &str) -> Result<RoleRecord, AppError> {
    let wanted = Role::from_name(requested)
        .ok_or_else(|| AppError::InvalidRequest(format!("Unknown role: {}", requested)))?;

    list_roles(pool)
        .await?
        .into_iter()
        .find(|role| Role::from_name(&role.name) == Some(wanted))
        .ok_or(AppError::NotFound("Role"))
}

/// Create a user.
///
/// # Validation
///
/// - Email must contain `@` and be unique (case-insensitive)
/// - Role must be one of admin, employee (staff), accountant, customer
/// - Password, when given, must be at least 8 characters
pub async fn create_user(pool: &DbPool, request: CreateUserRequest) -> Result<User, AppError> {
    let email = request.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::InvalidRequest("Invalid email address".to_string()));
    }

    if find_by_email(pool, &email).await?.is_some() {
        return Err(AppError::Conflict(format!("User {} already exists", email)));
    }

    let password_hash = match request.password.as_deref() {
        Some(password) if password.len() < auth_service::MIN_PASSWORD_LEN => {
            return Err(AppError::InvalidRequest(format!(
                "Password must be at least {} characters",
                auth_service::MIN_PASSWORD_LEN
            )));
        }
        Some(password) => Some(auth_service::hash_password(password)?),
        None => None,
    };

    let role = resolve_role(pool, &request.role).await?;

    let user_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (name, email, phone, password_hash, role_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(request.name)
    .bind(&email)
    .bind(request.phone)
    .bind(password_hash)
    .bind(role.id)
    .fetch_one(pool)
    .await?;

    tracing::info!("Created user {} with role {}", user_id, role.name);

    find_by_id(pool, user_id).await?.ok_or(AppError::NotFound("User"))
}

/// Activate or deactivate a user. Deactivation revokes open sessions.
pub async fn set_active(pool: &DbPool, user_id: i64, active: bool) -> Result<User, AppError> {
    let result = sqlx::query("UPDATE users SET active = $1 WHERE id = $2")
        .bind(active)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User"));
    }

    if !active {
        let revoked = auth_service::revoke_user_sessions(pool, user_id).await?;
        tracing::info!("Deactivated user {} ({} sessions revoked)", user_id, revoked);
    }

    find_by_id(pool, user_id).await?.ok_or(AppError::NotFound("User"))
}

/// Insert any missing default role. Returns how many were created.
pub async fn ensure_default_roles(pool: &DbPool) -> Result<u64, AppError> {
    let mut created = 0;
    for name in DEFAULT_ROLES {
        created += sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(pool)
            .await?
            .rows_affected();
    }

    Ok(created)
}

/// Create the admin user unless one with that email already exists.
///
/// Returns `true` when a user was created.
pub async fn ensure_admin(pool: &DbPool, email: &str, password: &str) -> Result<bool, AppError> {
    if find_by_email(pool, email).await?.is_some() {
        return Ok(false);
    }

    create_user(
        pool,
        CreateUserRequest {
            name: Some("Admin".to_string()),
            email: email.to_string(),
            phone: None,
            password: Some(password.to_string()),
            role: "admin".to_string(),
        },
    )
    .await?;

    Ok(true)
}
