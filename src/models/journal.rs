//! Journal entry models and API request/response types.
//!
//! This module defines:
//! - `JournalEntry`: Database entity for the header of a posting
//! - `JournalLineView`: A line joined with its account code and name
//! - Request types for posting, reversing and reviewing entries
//! - `JournalEntryResponse`: Header plus lines returned to clients

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::PostingLine;

/// Represents a journal entry header from the database.
///
/// # Database Table
///
/// Maps to the `journal_entries` table. Each entry:
/// - Has balanced lines in `journal_lines` (debits == credits)
/// - May be tagged with the customer, vehicle and invoice it concerns
/// - Is flagged `is_client_fund` when it moves money held for a client
/// - Moves through pending → approved | rejected
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct JournalEntry {
    pub id: i64,
    pub entry_date: NaiveDate,
    pub description: String,
    pub reference: Option<String>,
    pub customer_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub is_client_fund: bool,
    pub status: String,
    pub notes: Option<String>,

    /// If a client posts the same idempotency_key twice, the second request
    /// returns the original entry instead of creating a duplicate.
    pub idempotency_key: Option<String>,

    pub created_by_user_id: Option<i64>,
    pub approved_by_user_id: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,

    /// Set on entries created by reversing another entry
    pub reversal_of_entry_id: Option<i64>,

    /// Invoice the entry bills or settles
    pub invoice_id: Option<i64>,

    pub created_at: DateTime<Utc>,
}

/// A journal line with its account resolved.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct JournalLineView {
    pub id: i64,
    pub entry_id: i64,
    pub account_id: i64,
    pub account_code: String,
    pub account_name: String,
    pub debit_baisa: i64,
    pub credit_baisa: i64,
}

impl JournalLineView {
    pub fn to_posting_line(&self) -> PostingLine {
        PostingLine {
            account_code: self.account_code.clone(),
            debit_baisa: self.debit_baisa,
            credit_baisa: self.credit_baisa,
        }
    }
}

/// Request to post a journal entry.
///
/// # JSON Example
///
/// ```json
/// {
///   "entry_date": "2025-10-28",
///   "description": "Deposit for Land Cruiser",
///   "reference": "DEP-0042",
///   "customer_id": 3,
///   "is_client_fund": true,
///   "idempotency_key": "dep-0042",
///   "lines": [
///     { "account_code": "A100", "debit_baisa": 1000000 },
///     { "account_code": "L200", "credit_baisa": 1000000 }
///   ]
/// }
/// ```
///
/// # Validation
///
/// - At least two one-sided, non-negative lines
/// - Debits must equal credits
/// - Entry date must be after the books lock date
/// - Every account code must exist and be active
#[derive(Debug, Clone, Deserialize)]
pub struct PostJournalRequest {
    /// Defaults to today (UTC)
    pub entry_date: Option<NaiveDate>,
    pub description: String,
    pub reference: Option<String>,
    pub customer_id: Option<i64>,
    pub vehicle_id: Option<i64>,

    #[serde(default)]
    pub is_client_fund: bool,

    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
    pub invoice_id: Option<i64>,

    /// Post straight to approved (default) or leave pending for review
    #[serde(default = "default_auto_approve")]
    pub auto_approve: bool,

    pub lines: Vec<PostingLine>,
}

fn default_auto_approve() -> bool {
    true
}

impl PostJournalRequest {
    /// Approved entry used by services that post on the user's behalf.
    pub fn system(entry_date: NaiveDate, description: String, lines: Vec<PostingLine>) -> Self {
        Self {
            entry_date: Some(entry_date),
            description,
            reference: None,
            customer_id: None,
            vehicle_id: None,
            is_client_fund: false,
            notes: None,
            idempotency_key: None,
            auto_approve: true,
            invoice_id: None,
            lines,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReverseRequest {
    /// Defaults to today (UTC)
    pub entry_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JournalQuery {
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub customer_id: Option<i64>,
    pub invoice_id: Option<i64>,
    pub limit: Option<i64>,
}

/// Response returned for journal endpoints.
#[derive(Debug, Serialize)]
pub struct JournalEntryResponse {
    #[serde(flatten)]
    pub entry: JournalEntry,
    pub lines: Vec<JournalLineView>,
    pub total_baisa: i64,
}

impl JournalEntryResponse {
    pub fn new(entry: JournalEntry, lines: Vec<JournalLineView>) -> Self {
        let total_baisa = lines.iter().map(|line| line.debit_baisa).sum();
        Self {
            entry,
            lines,
            total_baisa,
        }
    }
}
