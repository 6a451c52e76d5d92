//! Journal service - posting, reviewing and reversing journal entries.
//!
//! This service handles:
//! - Line validation and account resolution
//! - Idempotency checking
//! - Lock date enforcement
//! - The pending → approved | rejected workflow
//!
//! # Atomicity Guarantees
//!
//! An entry header and all of its lines are written in one PostgreSQL
//! transaction. Services that post on behalf of a business event (deposits,
//! expenses) call [`post_entry_in_tx`] inside their own transaction so the
//! event row and its entry commit together.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{PgExecutor, Postgres, Transaction};

use crate::{
    db::DbPool,
    error::AppError,
    ledger::{self, EntryStatus, PostingLine},
    models::journal::{
        JournalEntry, JournalEntryResponse, JournalLineView, JournalQuery, PostJournalRequest,
        ReverseRequest,
    },
    services::{invoice_service, settings_service},
};

const ENTRY_COLUMNS: &str = r#"
    id, entry_date, description, reference, customer_id, vehicle_id, is_client_fund,
    status, notes, idempotency_key, created_by_user_id, approved_by_user_id, approved_at,
    reversal_of_entry_id, invoice_id, created_at
"#;

/// Business record an entry was posted for. Such entries are undone
/// through their own endpoints, never by a bare reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOwner {
    Deposit(i64),
    Expense(i64),
    ExpensePayment(i64),
}

impl EntryOwner {
    fn from_kind(kind: &str, id: i64) -> Option<Self> {
        match kind {
            "deposit" => Some(EntryOwner::Deposit(id)),
            "expense" => Some(EntryOwner::Expense(id)),
            "expense_payment" => Some(EntryOwner::ExpensePayment(id)),
            _ => None,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AccountRef {
    id: i64,
    code: String,
    active: bool,
}

/// Post a journal entry.
///
/// # Process
///
/// 1. Check for duplicate idempotency key
/// 2. Start database transaction
/// 3. Validate, resolve accounts and insert header and lines
/// 4. Commit (or rollback on error)
///
/// # Errors
///
/// - `Ledger`: Unbalanced or malformed lines, or the date is locked
/// - `InvalidRequest`: Unknown or inactive account code, empty description
/// - `Database`: Database error occurred
pub async fn post_entry(
    pool: &DbPool,
    user_id: Option<i64>,
    request: &PostJournalRequest,
) -> Result<JournalEntryResponse, AppError> {
    if let Some(ref key) = request.idempotency_key {
        if let Some(existing) = find_by_idempotency_key(pool, key).await? {
            let lines = fetch_lines(pool, existing.id).await?;
            ensure_same_posting(&existing, &lines, request)?;
            tracing::info!("Idempotent replay of journal entry {}", existing.id);
            return Ok(JournalEntryResponse::new(existing, lines));
        }
    }

    let mut tx = pool.begin().await?;
    let entry = post_entry_in_tx(&mut tx, user_id, request).await?;
    let lines = fetch_lines(&mut *tx, entry.id).await?;
    tx.commit().await?;

    Ok(JournalEntryResponse::new(entry, lines))
}

/// A repeated idempotency key must carry the same posting as the entry it
/// first created; anything else is a client bug and gets a 409.
fn ensure_same_posting(
    original: &JournalEntry,
    lines: &[JournalLineView],
    request: &PostJournalRequest,
) -> Result<(), AppError> {
    let same_lines = lines.len() == request.lines.len()
        && lines
            .iter()
            .zip(&request.lines)
            .all(|(stored, requested)| stored.to_posting_line() == *requested);
    let same_date = request
        .entry_date
        .is_none_or(|date| date == original.entry_date);

    if same_lines && same_date && original.description == request.description.trim() {
        return Ok(());
    }

    Err(AppError::Conflict(format!(
        "Idempotency key was already used for journal entry {} with different content",
        original.id
    )))
}

/// Validate and write an entry inside an open transaction. Does not commit.
pub async fn post_entry_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Option<i64>,
    request: &PostJournalRequest,
) -> Result<JournalEntry, AppError> {
    if request.description.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Description is required".to_string(),
        ));
    }

    let totals = ledger::validate_lines(&request.lines)?;

    let entry_date = request
        .entry_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let locked_until = settings_service::books_locked_until(&mut **tx).await?;
    ledger::ensure_open_period(entry_date, locked_until)?;

    let account_ids = resolve_accounts(tx, &request.lines).await?;

    if let Some(invoice_id) = request.invoice_id {
        invoice_service::check_entry_invoice_in_tx(tx, invoice_id, request.customer_id).await?;
    }

    let status = if request.auto_approve {
        EntryStatus::Approved
    } else {
        EntryStatus::Pending
    };
    let approved_by = if request.auto_approve { user_id } else { None };

    let entry = sqlx::query_as::<_, JournalEntry>(&format!(
        r#"
        INSERT INTO journal_entries (
            entry_date, description, reference, customer_id, vehicle_id, is_client_fund,
            status, notes, idempotency_key, created_by_user_id, approved_by_user_id, invoice_id,
            approved_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                CASE WHEN $7 = 'approved' THEN NOW() END)
        RETURNING {ENTRY_COLUMNS}
        "#
    ))
    .bind(entry_date)
    .bind(request.description.trim())
    .bind(&request.reference)
    .bind(request.customer_id)
    .bind(request.vehicle_id)
    .bind(request.is_client_fund)
    .bind(status.as_str())
    .bind(&request.notes)
    .bind(&request.idempotency_key)
    .bind(user_id)
    .bind(approved_by)
    .bind(request.invoice_id)
    .fetch_one(&mut **tx)
    .await?;

    for (line, account_id) in request.lines.iter().zip(account_ids) {
        sqlx::query(
            r#"
            INSERT INTO journal_lines (entry_id, account_id, debit_baisa, credit_baisa)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.id)
        .bind(account_id)
        .bind(line.debit_baisa)
        .bind(line.credit_baisa)
        .execute(&mut **tx)
        .await?;
    }

    tracing::info!(
        "Posted journal entry {} ({}) dated {} for {} baisa",
        entry.id,
        entry.status,
        entry.entry_date,
        totals.debits
    );

    Ok(entry)
}

/// Map every line's account code to an active account id, in line order.
async fn resolve_accounts(
    tx: &mut Transaction<'_, Postgres>,
    lines: &[PostingLine],
) -> Result<Vec<i64>, AppError> {
    let codes: Vec<String> = lines.iter().map(|line| line.account_code.clone()).collect();

    let accounts: HashMap<String, AccountRef> = sqlx::query_as::<_, AccountRef>(
        "SELECT id, code, active FROM accounts WHERE code = ANY($1)",
    )
    .bind(&codes)
    .fetch_all(&mut **tx)
    .await?
    .into_iter()
    .map(|account| (account.code.clone(), account))
    .collect();

    lines
        .iter()
        .map(|line| match accounts.get(&line.account_code) {
            Some(account) if account.active => Ok(account.id),
            Some(_) => Err(AppError::InvalidRequest(format!(
                "Account {} is inactive",
                line.account_code
            ))),
            None => Err(AppError::InvalidRequest(format!(
                "Unknown account code {}",
                line.account_code
            ))),
        })
        .collect()
}

async fn find_by_idempotency_key(
    pool: &DbPool,
    key: &str,
) -> Result<Option<JournalEntry>, AppError> {
    let entry = sqlx::query_as::<_, JournalEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE idempotency_key = $1"
    ))
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(entry)
}

pub async fn fetch_lines<'e, E: PgExecutor<'e>>(
    executor: E,
    entry_id: i64,
) -> Result<Vec<JournalLineView>, AppError> {
    let lines = sqlx::query_as::<_, JournalLineView>(
        r#"
        SELECT l.id, l.entry_id, l.account_id, a.code AS account_code, a.name AS account_name,
               l.debit_baisa, l.credit_baisa
        FROM journal_lines l
        JOIN accounts a ON a.id = l.account_id
        WHERE l.entry_id = $1
        ORDER BY l.id
        "#,
    )
    .bind(entry_id)
    .fetch_all(executor)
    .await?;

    Ok(lines)
}

pub async fn get_entry(pool: &DbPool, entry_id: i64) -> Result<JournalEntryResponse, AppError> {
    let entry = sqlx::query_as::<_, JournalEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE id = $1"
    ))
    .bind(entry_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Journal entry"))?;

    let lines = fetch_lines(pool, entry.id).await?;

    Ok(JournalEntryResponse::new(entry, lines))
}

/// Entries newest first. `limit` defaults to 100 and is capped at 500.
pub async fn list_entries(
    pool: &DbPool,
    query: &JournalQuery,
) -> Result<Vec<JournalEntry>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<EntryStatus>)
        .transpose()?;

    let entries = sqlx::query_as::<_, JournalEntry>(&format!(
        r#"
        SELECT {ENTRY_COLUMNS}
        FROM journal_entries
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::date IS NULL OR entry_date >= $2)
          AND ($3::date IS NULL OR entry_date <= $3)
          AND ($4::bigint IS NULL OR customer_id = $4)
          AND ($5::bigint IS NULL OR invoice_id = $5)
        ORDER BY entry_date DESC, id DESC
        LIMIT $6
        "#
    ))
    .bind(status.map(|s| s.as_str()))
    .bind(query.from)
    .bind(query.to)
    .bind(query.customer_id)
    .bind(query.invoice_id)
    .bind(query.limit.unwrap_or(100).clamp(1, 500))
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Approve a pending entry. The entry date must still be open.
pub async fn approve_entry(
    pool: &DbPool,
    entry_id: i64,
    user_id: i64,
    notes: Option<String>,
) -> Result<JournalEntryResponse, AppError> {
    review_entry(pool, entry_id, user_id, EntryStatus::Approved, notes).await
}

pub async fn reject_entry(
    pool: &DbPool,
    entry_id: i64,
    user_id: i64,
    notes: Option<String>,
) -> Result<JournalEntryResponse, AppError> {
    review_entry(pool, entry_id, user_id, EntryStatus::Rejected, notes).await
}

async fn review_entry(
    pool: &DbPool,
    entry_id: i64,
    user_id: i64,
    to: EntryStatus,
    notes: Option<String>,
) -> Result<JournalEntryResponse, AppError> {
    let mut tx = pool.begin().await?;

    let entry = sqlx::query_as::<_, JournalEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE id = $1 FOR UPDATE"
    ))
    .bind(entry_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Journal entry"))?;

    let from: EntryStatus = entry.status.parse()?;
    let locked_until = settings_service::books_locked_until(&mut *tx).await?;
    let status = ledger::review(from, to, entry.entry_date, locked_until)?;

    let entry = sqlx::query_as::<_, JournalEntry>(&format!(
        r#"
        UPDATE journal_entries
        SET status = $1,
            approved_by_user_id = $2,
            approved_at = NOW(),
            notes = COALESCE($3, notes)
        WHERE id = $4
        RETURNING {ENTRY_COLUMNS}
        "#
    ))
    .bind(status.as_str())
    .bind(user_id)
    .bind(notes)
    .bind(entry_id)
    .fetch_one(&mut *tx)
    .await?;

    let lines = fetch_lines(&mut *tx, entry.id).await?;
    tx.commit().await?;

    tracing::info!("Journal entry {} {} by user {}", entry.id, status, user_id);

    Ok(JournalEntryResponse::new(entry, lines))
}

/// Reverse an approved entry with a mirror-image approved entry.
///
/// # Errors
///
/// - `Ledger`: the original is not approved, or the reversal date is locked
/// - `Conflict`: the entry was already reversed, or it belongs to a deposit
///   or an expense
pub async fn reverse_entry(
    pool: &DbPool,
    entry_id: i64,
    user_id: i64,
    request: ReverseRequest,
) -> Result<JournalEntryResponse, AppError> {
    let mut tx = pool.begin().await?;

    let original = sqlx::query_as::<_, JournalEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE id = $1 FOR UPDATE"
    ))
    .bind(entry_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Journal entry"))?;

    let already_reversed: Option<i64> =
        sqlx::query_scalar("SELECT id FROM journal_entries WHERE reversal_of_entry_id = $1")
            .bind(entry_id)
            .fetch_optional(&mut *tx)
            .await?;
    let owner = find_owner(&mut tx, entry_id).await?;
    ensure_reversible(&original, already_reversed, owner)?;

    let original_lines: Vec<PostingLine> = fetch_lines(&mut *tx, entry_id)
        .await?
        .iter()
        .map(JournalLineView::to_posting_line)
        .collect();

    let reversal_request = PostJournalRequest {
        entry_date: request.entry_date,
        description: request
            .description
            .unwrap_or_else(|| format!("Reversal of entry {}: {}", entry_id, original.description)),
        reference: original.reference.clone(),
        customer_id: original.customer_id,
        vehicle_id: original.vehicle_id,
        is_client_fund: original.is_client_fund,
        notes: None,
        idempotency_key: None,
        auto_approve: true,
        invoice_id: original.invoice_id,
        lines: ledger::reverse_lines(&original_lines),
    };

    let reversal = post_entry_in_tx(&mut tx, Some(user_id), &reversal_request).await?;

    let reversal = sqlx::query_as::<_, JournalEntry>(&format!(
        "UPDATE journal_entries SET reversal_of_entry_id = $1 WHERE id = $2 RETURNING {ENTRY_COLUMNS}"
    ))
    .bind(entry_id)
    .bind(reversal.id)
    .fetch_one(&mut *tx)
    .await?;

    let lines = fetch_lines(&mut *tx, reversal.id).await?;
    tx.commit().await?;

    tracing::info!("Journal entry {} reversed by entry {}", entry_id, reversal.id);

    Ok(JournalEntryResponse::new(reversal, lines))
}

/// Deposit or expense row that references the entry, if any.
async fn find_owner(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: i64,
) -> Result<Option<EntryOwner>, AppError> {
    let row: Option<(String, i64)> = sqlx::query_as(
        r#"
        SELECT 'deposit', id FROM customer_deposits WHERE journal_entry_id = $1
        UNION ALL
        SELECT 'expense', id FROM operational_expenses WHERE journal_entry_id = $1
        UNION ALL
        SELECT 'expense_payment', id FROM operational_expenses WHERE payment_entry_id = $1
        LIMIT 1
        "#,
    )
    .bind(entry_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.and_then(|(kind, id)| EntryOwner::from_kind(&kind, id)))
}

/// Only approved entries that nothing else depends on can be reversed, once.
fn ensure_reversible(
    entry: &JournalEntry,
    reversed_by: Option<i64>,
    owner: Option<EntryOwner>,
) -> Result<(), AppError> {
    let status: EntryStatus = entry.status.parse()?;
    if status != EntryStatus::Approved {
        return Err(ledger::LedgerError::InvalidTransition {
            from: status,
            to: EntryStatus::Approved,
        }
        .into());
    }

    if let Some(reversal_id) = reversed_by {
        return Err(AppError::Conflict(format!(
            "Journal entry {} was already reversed by entry {}",
            entry.id, reversal_id
        )));
    }

    match owner {
        None => Ok(()),
        Some(EntryOwner::Deposit(deposit_id)) => Err(AppError::Conflict(format!(
            "Journal entry {} records deposit {}; use POST /api/v1/deposits/{}/refund",
            entry.id, deposit_id, deposit_id
        ))),
        Some(EntryOwner::Expense(expense_id)) => Err(AppError::Conflict(format!(
            "Journal entry {} records expense {} and cannot be reversed on its own",
            entry.id, expense_id
        ))),
        Some(EntryOwner::ExpensePayment(expense_id)) => Err(AppError::Conflict(format!(
            "Journal entry {} pays expense {} and cannot be reversed on its own",
            entry.id, expense_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(id: i64, status: &str) -> JournalEntry {
        JournalEntry {
            id,
            entry_date: date(2025, 10, 1),
            description: "Owner capital".to_string(),
            reference: None,
            customer_id: None,
            vehicle_id: None,
            is_client_fund: false,
            status: status.to_string(),
            notes: None,
            idempotency_key: Some("capital-2025-10".to_string()),
            created_by_user_id: Some(1),
            approved_by_user_id: Some(1),
            approved_at: None,
            reversal_of_entry_id: None,
            invoice_id: None,
            created_at: Utc::now(),
        }
    }

    fn line(id: i64, code: &str, debit: i64, credit: i64) -> JournalLineView {
        JournalLineView {
            id,
            entry_id: 5,
            account_id: id,
            account_code: code.to_string(),
            account_name: code.to_string(),
            debit_baisa: debit,
            credit_baisa: credit,
        }
    }

    fn request(lines: Vec<PostingLine>) -> PostJournalRequest {
        PostJournalRequest {
            idempotency_key: Some("capital-2025-10".to_string()),
            ..PostJournalRequest::system(date(2025, 10, 1), "Owner capital".to_string(), lines)
        }
    }

    #[test]
    fn test_repeated_key_with_same_posting_replays() {
        let original = entry(5, "approved");
        let stored = vec![line(1, "A100", 5_000_000, 0), line(2, "Q100", 0, 5_000_000)];
        let repeat = request(vec![
            PostingLine::debit("A100", 5_000_000),
            PostingLine::credit("Q100", 5_000_000),
        ]);
        assert!(ensure_same_posting(&original, &stored, &repeat).is_ok());

        let undated = PostJournalRequest {
            entry_date: None,
            description: "  Owner capital ".to_string(),
            ..repeat
        };
        assert!(ensure_same_posting(&original, &stored, &undated).is_ok());
    }

    #[test]
    fn test_repeated_key_with_other_amounts_conflicts() {
        let original = entry(5, "approved");
        let stored = vec![line(1, "A100", 5_000_000, 0), line(2, "Q100", 0, 5_000_000)];
        let changed = request(vec![
            PostingLine::debit("A100", 6_000_000),
            PostingLine::credit("Q100", 6_000_000),
        ]);
        assert!(matches!(
            ensure_same_posting(&original, &stored, &changed),
            Err(AppError::Conflict(_))
        ));

        let other_day = PostJournalRequest {
            entry_date: Some(date(2025, 10, 2)),
            ..request(vec![
                PostingLine::debit("A100", 5_000_000),
                PostingLine::credit("Q100", 5_000_000),
            ])
        };
        assert!(matches!(
            ensure_same_posting(&original, &stored, &other_day),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_only_approved_entries_reverse() {
        assert!(ensure_reversible(&entry(5, "approved"), None, None).is_ok());
        assert!(matches!(
            ensure_reversible(&entry(5, "pending"), None, None),
            Err(AppError::Ledger(ledger::LedgerError::InvalidTransition { .. }))
        ));
    }

    #[test]
    fn test_entry_reverses_once() {
        assert!(matches!(
            ensure_reversible(&entry(5, "approved"), Some(9), None),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_deposit_and_expense_entries_cannot_be_reversed() {
        for owner in [
            EntryOwner::Deposit(3),
            EntryOwner::Expense(4),
            EntryOwner::ExpensePayment(4),
        ] {
            assert!(matches!(
                ensure_reversible(&entry(5, "approved"), None, Some(owner)),
                Err(AppError::Conflict(_))
            ));
        }
    }

    #[test]
    fn test_deposit_conflict_points_to_refund() {
        let err = ensure_reversible(&entry(5, "approved"), None, Some(EntryOwner::Deposit(3)))
            .unwrap_err();
        assert!(err.to_string().contains("/api/v1/deposits/3/refund"));
    }

    #[test]
    fn test_owner_kinds() {
        assert_eq!(EntryOwner::from_kind("deposit", 1), Some(EntryOwner::Deposit(1)));
        assert_eq!(
            EntryOwner::from_kind("expense_payment", 2),
            Some(EntryOwner::ExpensePayment(2))
        );
        assert_eq!(EntryOwner::from_kind("invoice", 3), None);
    }
}
