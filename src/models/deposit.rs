//! Client deposit models.
//!
//! A deposit is money a customer hands over before a car is bought. It sits
//! in L200 Customer Deposits as a liability until it is consumed by earned
//! commission or refunded.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct CustomerDeposit {
    pub id: i64,
    pub customer_id: i64,
    pub vehicle_id: Option<i64>,
    pub amount_baisa: i64,

    /// Still held for the customer; never negative
    pub remaining_baisa: i64,

    pub method: Option<String>,
    pub reference: Option<String>,

    /// held, applied (fully consumed) or refunded
    pub status: String,

    pub journal_entry_id: i64,
    pub received_at: NaiveDate,
    pub refunded_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Request to record money received from a customer.
///
/// # JSON Example
///
/// ```json
/// {
///   "customer_id": 3,
///   "vehicle_id": 12,
///   "amount_baisa": 1000000,
///   "method": "bank_transfer",
///   "reference": "TRX-88812"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct ReceiveDepositRequest {
    pub customer_id: i64,
    pub vehicle_id: Option<i64>,
    pub amount_baisa: i64,
    pub method: Option<String>,
    pub reference: Option<String>,
    /// Defaults to today (UTC)
    pub received_at: Option<NaiveDate>,
}

/// Request to take an earned commission out of a deposit.
#[derive(Debug, Deserialize)]
pub struct DeductCommissionRequest {
    pub amount_baisa: i64,
    pub description: Option<String>,
    /// Defaults to today (UTC)
    pub entry_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefundDepositRequest {
    /// Defaults to today (UTC)
    pub refunded_at: Option<NaiveDate>,
}

/// Deposit rows together with the journal balance they add up to.
#[derive(Debug, Serialize)]
pub struct DepositStatement {
    pub customer_id: i64,
    /// L200 credit balance of entries tagged with this customer
    pub balance_baisa: i64,
    pub deposits: Vec<CustomerDeposit>,
}
