//! Loads approved journal lines for the pure report functions in
//! [`crate::ledger::reports`].

use chrono::NaiveDate;

use crate::{
    db::DbPool,
    error::AppError,
    ledger::{AccountType, reports::LedgerRow},
};

#[derive(sqlx::FromRow)]
struct LedgerRecord {
    entry_id: i64,
    entry_date: NaiveDate,
    reference: Option<String>,
    description: String,
    is_client_fund: bool,
    account_code: String,
    account_name: String,
    account_type: String,
    is_cash: bool,
    debit_baisa: i64,
    credit_baisa: i64,
}

impl TryFrom<LedgerRecord> for LedgerRow {
    type Error = AppError;

    fn try_from(record: LedgerRecord) -> Result<Self, Self::Error> {
        Ok(LedgerRow {
            entry_id: record.entry_id,
            entry_date: record.entry_date,
            reference: record.reference,
            description: record.description,
            is_client_fund: record.is_client_fund,
            account_code: record.account_code,
            account_name: record.account_name,
            account_type: record.account_type.parse::<AccountType>()?,
            is_cash: record.is_cash,
            debit_baisa: record.debit_baisa,
            credit_baisa: record.credit_baisa,
        })
    }
}

/// Every approved line dated on or before `to`, in posting order.
///
/// Reports need history before their window (opening balances), so only
/// the upper bound is applied here.
pub async fn load_ledger(pool: &DbPool, to: Option<NaiveDate>) -> Result<Vec<LedgerRow>, AppError> {
    let records = sqlx::query_as::<_, LedgerRecord>(
        r#"
        SELECT e.id AS entry_id, e.entry_date, e.reference, e.description, e.is_client_fund,
               a.code AS account_code, a.name AS account_name, a.account_type, a.is_cash,
               l.debit_baisa, l.credit_baisa
        FROM journal_lines l
        JOIN journal_entries e ON e.id = l.entry_id
        JOIN accounts a ON a.id = l.account_id
        WHERE e.status = 'approved'
          AND ($1::date IS NULL OR e.entry_date <= $1)
        ORDER BY e.entry_date, e.id, l.id
        "#,
    )
    .bind(to)
    .fetch_all(pool)
    .await?;

    records.into_iter().map(LedgerRow::try_from).collect()
}

/// Balance of one account in its normal direction, from approved lines.
pub async fn account_balance(
    pool: &DbPool,
    account_id: i64,
    account_type: AccountType,
) -> Result<i64, AppError> {
    let (debits, credits): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(l.debit_baisa), 0)::BIGINT, COALESCE(SUM(l.credit_baisa), 0)::BIGINT
        FROM journal_lines l
        JOIN journal_entries e ON e.id = l.entry_id
        WHERE l.account_id = $1 AND e.status = 'approved'
        "#,
    )
    .bind(account_id)
    .fetch_one(pool)
    .await?;

    Ok(account_type.signed_balance(debits, credits))
}
