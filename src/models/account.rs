//! Chart-of-accounts models and API request/response types.
//!
//! This module defines:
//! - `Account`: Database entity representing a general-ledger account
//! - `CreateAccountRequest`: Request body for adding an account
//! - `AccountResponse`: Response body returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents an account record from the database.
///
/// # Database Table
///
/// Maps to the `accounts` table. Each account:
/// - Has a unique short code (e.g. `A100`, `L200`)
/// - Belongs to one of the five account types
/// - Is flagged `is_cash` when it holds cash or bank money (drives the cash flow report)
///
/// # Balance Storage
///
/// Accounts carry no stored balance. Balances are always derived from
/// approved journal lines, so they can never drift from the ledger.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Account {
    pub id: i64,

    /// Chart-of-accounts code, unique
    pub code: String,

    pub name: String,

    /// One of ASSET, LIABILITY, EQUITY, REVENUE, EXPENSE
    pub account_type: String,

    /// Currency code (ISO 4217, 3 letters); the ledger runs in OMR
    pub currency_code: String,

    pub is_cash: bool,

    /// Inactive accounts cannot receive new postings
    pub active: bool,

    pub created_at: DateTime<Utc>,
}

/// Request body for creating a new account.
///
/// # JSON Example
///
/// ```json
/// {
///   "code": "A120",
///   "name": "Petty Cash",
///   "account_type": "ASSET",
///   "is_cash": true
/// }
/// ```
///
/// # Validation
///
/// - `code`: Required, unique, at most 20 characters
/// - `account_type`: Required, one of the five types (case-insensitive)
/// - `currency_code`: Optional, defaults to "OMR"
/// - `is_cash`: Optional, defaults to false
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub code: String,
    pub name: String,
    pub account_type: String,

    #[serde(default = "default_currency")]
    pub currency_code: String,

    #[serde(default)]
    pub is_cash: bool,
}

/// Default currency value when not specified in request.
fn default_currency() -> String {
    "OMR".to_string()
}

/// Response body for account endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 5,
///   "code": "L200",
///   "name": "Customer Deposits",
///   "account_type": "LIABILITY",
///   "currency_code": "OMR",
///   "is_cash": false,
///   "active": true,
///   "balance_baisa": 300000
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub currency_code: String,
    pub is_cash: bool,
    pub active: bool,

    /// Balance in the account's normal direction; only present on single-account reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_baisa: Option<i64>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            code: account.code,
            name: account.name,
            account_type: account.account_type,
            currency_code: account.currency_code,
            is_cash: account.is_cash,
            active: account.active,
            balance_baisa: None,
        }
    }
}

impl AccountResponse {
    pub fn with_balance(mut self, balance_baisa: i64) -> Self {
        self.balance_baisa = Some(balance_baisa);
        self
    }
}
