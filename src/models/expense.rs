use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An operating cost, in its original currency and converted into OMR.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct OperationalExpense {
    pub id: i64,
    pub vehicle_id: Option<i64>,
    pub category: String,
    pub original_amount_minor: i64,
    pub original_currency: String,
    pub amount_baisa: i64,
    /// OMR per unit of original currency, in millionths; `None` for OMR
    pub exchange_rate_micros: Option<i64>,
    pub paid: bool,
    pub paid_at: Option<NaiveDate>,
    pub description: Option<String>,
    pub supplier: Option<String>,
    pub journal_entry_id: i64,
    pub payment_entry_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Request to record an operating cost.
///
/// # JSON Example
///
/// ```json
/// {
///   "category": "internal_shipping",
///   "amount_minor": 45000,
///   "currency": "USD",
///   "vehicle_id": 12,
///   "supplier": "Gulf Haulage",
///   "paid": false
/// }
/// ```
///
/// `amount_minor` is in the currency's minor unit (cents for USD, baisa for OMR).
#[derive(Debug, Deserialize)]
pub struct RecordExpenseRequest {
    pub category: String,
    pub amount_minor: i64,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Overrides the configured OMR/USD rate, in millionths
    pub exchange_rate_micros: Option<i64>,

    pub vehicle_id: Option<i64>,
    pub description: Option<String>,
    pub supplier: Option<String>,

    #[serde(default)]
    pub paid: bool,

    /// Defaults to today (UTC)
    pub entry_date: Option<NaiveDate>,
}

fn default_currency() -> String {
    "OMR".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct PayExpenseRequest {
    /// Defaults to today (UTC)
    pub paid_at: Option<NaiveDate>,
}
