use chrono::{DateTime, Utc};
use serde::Serialize;

/// A database dump written by the backup tool.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Backup {
    pub id: i64,
    pub path: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}
