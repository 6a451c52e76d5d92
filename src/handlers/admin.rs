//! Admin-only views: audit trail and backups.
//!
//! - GET /api/v1/audit-logs?target_type=&limit=
//! - GET /api/v1/backups

use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        audit::{AuditLog, AuditQuery},
        backup::Backup,
        role::ADMIN_ONLY,
    },
    services::{audit_service, backup_service},
};

/// Newest audit entries first; `limit` defaults to 100.
pub async fn list_audit_logs(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditLog>>, AppError> {
    auth.require(ADMIN_ONLY)?;

    let logs = audit_service::list_recent(
        &pool,
        query.target_type.as_deref(),
        query.limit.unwrap_or(100),
    )
    .await?;

    Ok(Json(logs))
}

pub async fn list_backups(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Backup>>, AppError> {
    auth.require(ADMIN_ONLY)?;

    Ok(Json(backup_service::list_backups(&pool).await?))
}
