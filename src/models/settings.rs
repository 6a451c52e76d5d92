use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Singleton accounting settings row (`settings.id = 1`).
///
/// Rates are basis points: 500 = 5%.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Settings {
    pub vat_rate_bps: i64,
    pub customs_rate_bps: i64,
    /// No entry may be posted or approved on or before this date
    pub books_locked_until: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; omitted fields keep their value.
///
/// `clear_lock` removes the lock date, since `null` cannot be told apart from
/// "not sent" for `books_locked_until`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub vat_rate_bps: Option<i64>,
    pub customs_rate_bps: Option<i64>,
    pub books_locked_until: Option<NaiveDate>,
    #[serde(default)]
    pub clear_lock: bool,
}
