//! Expense service - operating costs in OMR or USD.
//!
//! An expense is posted when it is recorded: straight against the bank when
//! already paid, otherwise against Accounts Payable until [`pay_expense`]
//! settles it.

use chrono::Utc;

use crate::{
    db::DbPool,
    error::AppError,
    ledger::{self, PostingLine, codes, currency},
    models::{
        expense::{OperationalExpense, PayExpenseRequest, RecordExpenseRequest},
        journal::PostJournalRequest,
    },
    services::journal_service,
};

const EXPENSE_COLUMNS: &str = r#"
    id, vehicle_id, category, original_amount_minor, original_currency, amount_baisa,
    exchange_rate_micros, paid, paid_at, description, supplier, journal_entry_id,
    payment_entry_id, created_at
"#;

/// Expense account for a category. Shipping inside Oman has its own account.
pub fn expense_account(category: &str) -> &'static str {
    if category.trim().eq_ignore_ascii_case("internal_shipping") {
        codes::INTERNAL_SHIPPING_EXPENSES
    } else {
        codes::OPERATIONAL_EXPENSES
    }
}

/// Record an operating cost.
///
/// # Process
///
/// 1. Convert the amount to baisa (USD at the supplied or configured rate)
/// 2. Post Dr expense / Cr A100 when paid, Cr L210 otherwise
/// 3. Store the expense with its original amount and rate
///
/// # Errors
///
/// - `Ledger`: non-positive amount, unsupported currency, locked date
pub async fn record_expense(
    pool: &DbPool,
    user_id: i64,
    default_rate_micros: i64,
    request: RecordExpenseRequest,
) -> Result<OperationalExpense, AppError> {
    ledger::ensure_positive(request.amount_minor)?;
    if request.category.trim().is_empty() {
        return Err(AppError::InvalidRequest("Category is required".to_string()));
    }

    let currency_code = request.currency.trim().to_ascii_uppercase();
    let rate_micros = if currency_code == currency::FUNCTIONAL_CURRENCY {
        None
    } else {
        let rate = request.exchange_rate_micros.unwrap_or(default_rate_micros);
        ledger::ensure_positive(rate)?;
        Some(rate)
    };

    let amount_baisa =
        currency::to_baisa(request.amount_minor, &currency_code, rate_micros.unwrap_or(0))?;
    ledger::ensure_positive(amount_baisa)?;

    let entry_date = request
        .entry_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let credit_account = if request.paid {
        codes::BANK
    } else {
        codes::ACCOUNTS_PAYABLE
    };
    let description = request
        .description
        .clone()
        .unwrap_or_else(|| format!("Expense: {}", request.category.trim()));

    let mut tx = pool.begin().await?;

    let entry = journal_service::post_entry_in_tx(
        &mut tx,
        Some(user_id),
        &PostJournalRequest {
            reference: request.supplier.clone(),
            vehicle_id: request.vehicle_id,
            ..PostJournalRequest::system(
                entry_date,
                description,
                vec![
                    PostingLine::debit(expense_account(&request.category), amount_baisa),
                    PostingLine::credit(credit_account, amount_baisa),
                ],
            )
        },
    )
    .await?;

    let expense = sqlx::query_as::<_, OperationalExpense>(&format!(
        r#"
        INSERT INTO operational_expenses (
            vehicle_id, category, original_amount_minor, original_currency, amount_baisa,
            exchange_rate_micros, paid, paid_at, description, supplier, journal_entry_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, CASE WHEN $7 THEN $8::date END, $9, $10, $11)
        RETURNING {EXPENSE_COLUMNS}
        "#
    ))
    .bind(request.vehicle_id)
    .bind(request.category.trim())
    .bind(request.amount_minor)
    .bind(&currency_code)
    .bind(amount_baisa)
    .bind(rate_micros)
    .bind(request.paid)
    .bind(entry_date)
    .bind(request.description)
    .bind(request.supplier)
    .bind(entry.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Expense {} recorded: {} {} = {} baisa",
        expense.id,
        expense.original_amount_minor,
        expense.original_currency,
        expense.amount_baisa
    );

    Ok(expense)
}

/// Settle an unpaid expense: Dr L210 / Cr A100.
pub async fn pay_expense(
    pool: &DbPool,
    expense_id: i64,
    user_id: i64,
    request: PayExpenseRequest,
) -> Result<OperationalExpense, AppError> {
    let mut tx = pool.begin().await?;

    let expense = sqlx::query_as::<_, OperationalExpense>(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM operational_expenses WHERE id = $1 FOR UPDATE"
    ))
    .bind(expense_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Expense"))?;

    if expense.paid {
        return Err(AppError::Conflict(format!(
            "Expense {} is already paid",
            expense.id
        )));
    }

    let paid_at = request.paid_at.unwrap_or_else(|| Utc::now().date_naive());

    let payment = journal_service::post_entry_in_tx(
        &mut tx,
        Some(user_id),
        &PostJournalRequest {
            reference: expense.supplier.clone(),
            vehicle_id: expense.vehicle_id,
            ..PostJournalRequest::system(
                paid_at,
                format!("Payment of expense {}", expense.id),
                vec![
                    PostingLine::debit(codes::ACCOUNTS_PAYABLE, expense.amount_baisa),
                    PostingLine::credit(codes::BANK, expense.amount_baisa),
                ],
            )
        },
    )
    .await?;

    let expense = sqlx::query_as::<_, OperationalExpense>(&format!(
        r#"
        UPDATE operational_expenses
        SET paid = true, paid_at = $1, payment_entry_id = $2
        WHERE id = $3
        RETURNING {EXPENSE_COLUMNS}
        "#
    ))
    .bind(paid_at)
    .bind(payment.id)
    .bind(expense_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Expense {} paid by entry {}", expense.id, payment.id);

    Ok(expense)
}

pub async fn list_expenses(
    pool: &DbPool,
    vehicle_id: Option<i64>,
) -> Result<Vec<OperationalExpense>, AppError> {
    let expenses = sqlx::query_as::<_, OperationalExpense>(&format!(
        r#"
        SELECT {EXPENSE_COLUMNS}
        FROM operational_expenses
        WHERE ($1::bigint IS NULL OR vehicle_id = $1)
        ORDER BY created_at DESC, id DESC
        "#
    ))
    .bind(vehicle_id)
    .fetch_all(pool)
    .await?;

    Ok(expenses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_shipping_has_own_account() {
        assert_eq!(expense_account("internal_shipping"), "E210");
        assert_eq!(expense_account(" Internal_Shipping "), "E210");
    }

    #[test]
    fn test_other_categories_are_operational() {
        assert_eq!(expense_account("office"), "E200");
        assert_eq!(expense_account("customs_clearance"), "E200");
        assert_eq!(expense_account(""), "E200");
    }
}
