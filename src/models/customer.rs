//! Customers (clients) of the import business.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a customer record from the database.
///
/// `user_id` links the customer to a login with the `customer` role so the
/// customer can read their own deposit statement.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Customer {
    pub id: i64,
    pub user_id: Option<i64>,
    pub account_number: String,
    pub company_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a customer.
///
/// # JSON Example
///
/// ```json
/// {
///   "account_number": "CUST-001",
///   "company_name": "Gulf Motors LLC",
///   "address": "Sohar",
///   "user_id": 7
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub account_number: String,
    pub company_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub user_id: Option<i64>,
}
