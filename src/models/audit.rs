use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit trail record: who did what to which record.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AuditLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<i64>,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub target_type: Option<String>,
    pub limit: Option<i64>,
}
