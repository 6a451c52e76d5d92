//! Session authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the bearer token from the Authorization header
//! 2. Hash it and look up a live session for an active user
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use crate::{
    db::DbPool,
    error::AppError,
    models::{role::Role, session::SessionUser},
    services::auth_service,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Authentication context attached to authenticated requests.
///
/// Handlers extract it with `Extension<AuthContext>` and call
/// [`AuthContext::require`] with the roles allowed on the route.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub session_id: Uuid,
    pub user_id: i64,
    pub name: Option<String>,
    pub email: String,

    /// Canonical role; `None` for users whose role name is not recognised
    pub role: Option<Role>,
}

impl AuthContext {
    /// Fail with `Forbidden` unless the user holds one of `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), AppError> {
        match self.role {
            Some(role) if allowed.contains(&role) => Ok(()),
            _ => Err(AppError::Forbidden),
        }
    }
}

impl From<SessionUser> for AuthContext {
    fn from(session: SessionUser) -> Self {
        Self {
            session_id: session.session_id,
            user_id: session.user_id,
            name: session.name,
            email: session.email,
            role: session.role_name.as_deref().and_then(Role::from_name),
        }
    }
}

/// Bearer token from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Session authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>` header from request
/// 2. Hash the `<token>` using SHA-256
/// 3. Find a session with that hash that is not revoked, not expired,
///    and belongs to an active user
/// 4. If found: inject `AuthContext` into request, call next handler
/// 5. If not found: return 401 Unauthorized error
pub async fn auth_middleware(
    State(pool): State<DbPool>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token_hash = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .map(auth_service::hash_token)
        .ok_or(AppError::InvalidSession)?;

    let session = sqlx::query_as::<_, SessionUser>(
        r#"
        SELECT s.id AS session_id, u.id AS user_id, u.name, u.email,
               r.name AS role_name, s.expires_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        LEFT JOIN roles r ON r.id = u.role_id
        WHERE s.token_hash = $1
          AND s.revoked = false
          AND s.expires_at > NOW()
          AND u.active = true
        "#,
    )
    .bind(&token_hash)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::InvalidSession)?;

    request.extensions_mut().insert(AuthContext::from(session));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(role: Option<Role>) -> AuthContext {
        AuthContext {
            session_id: Uuid::nil(),
            user_id: 1,
            name: None,
            email: "a@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn test_require_checks_role_set() {
        assert!(context(Some(Role::Accountant)).require(crate::models::role::FINANCE).is_ok());
        assert!(matches!(
            context(Some(Role::Employee)).require(crate::models::role::FINANCE),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            context(None).require(crate::models::role::ADMIN_ONLY),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_staff_role_name_maps_to_employee() {
        let ctx = AuthContext::from(SessionUser {
            session_id: Uuid::nil(),
            user_id: 4,
            name: Some("Ops".to_string()),
            email: "ops@example.com".to_string(),
            role_name: Some("staff".to_string()),
            expires_at: chrono::Utc::now(),
        });

        assert_eq!(ctx.role, Some(Role::Employee));
        assert!(ctx.require(crate::models::role::OPERATIONS).is_ok());
    }
}
