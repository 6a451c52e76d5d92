//! Session model for bearer authentication.
//!
//! Tokens are handed to the client at login and only their SHA-256 hash is
//! kept, the same way API keys are commonly stored.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A live session joined with the user it belongs to.
///
/// Produced by the auth middleware lookup; rows for revoked or expired
/// sessions and inactive users are filtered out by the query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionUser {
    pub session_id: Uuid,
    pub user_id: i64,
    pub name: Option<String>,
    pub email: String,
    pub role_name: Option<String>,
    pub expires_at: DateTime<Utc>,
}
