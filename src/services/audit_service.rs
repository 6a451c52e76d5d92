//! Audit trail.
//!
//! Recording never fails the caller: the business action has already
//! happened by the time it is audited, so a failed insert is only logged.

use crate::{db::DbPool, error::AppError, models::audit::AuditLog};

pub async fn record(
    pool: &DbPool,
    user_id: Option<i64>,
    action: &str,
    target_type: &str,
    target_id: Option<i64>,
    meta: serde_json::Value,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO audit_logs (user_id, action, target_type, target_id, meta)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(action)
    .bind(target_type)
    .bind(target_id)
    .bind(meta)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!("Failed to record audit entry {} on {}: {:?}", action, target_type, e);
    }
}

/// Newest first, at most `limit` rows (capped at 500).
pub async fn list_recent(
    pool: &DbPool,
    target_type: Option<&str>,
    limit: i64,
) -> Result<Vec<AuditLog>, AppError> {
    let logs = sqlx::query_as::<_, AuditLog>(
        r#"
        SELECT id, user_id, action, target_type, target_id, meta, created_at
        FROM audit_logs
        WHERE ($1::text IS NULL OR target_type = $1)
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(target_type)
    .bind(limit.clamp(1, 500))
    .fetch_all(pool)
    .await?;

    Ok(logs)
}
