//! Deposit service - money held on behalf of customers.
//!
//! # Postings
//!
//! | Event              | Debit | Credit | Client fund |
//! |--------------------|-------|--------|-------------|
//! | Receive deposit    | A100  | L200   | yes         |
//! | Deduct commission  | L200  | R200   | no          |
//! | Refund remainder   | L200  | A100   | yes         |
//!
//! Commission is the only movement that becomes revenue. The deposit row and
//! its journal entry are always written in the same database transaction.

use chrono::Utc;

use crate::{
    db::DbPool,
    error::AppError,
    ledger::{self, PostingLine, codes},
    models::{
        deposit::{
            CustomerDeposit, DeductCommissionRequest, DepositStatement, ReceiveDepositRequest,
            RefundDepositRequest,
        },
        journal::PostJournalRequest,
    },
    services::journal_service,
};

const HELD: &str = "held";
const APPLIED: &str = "applied";
const REFUNDED: &str = "refunded";

const DEPOSIT_COLUMNS: &str = r#"
    id, customer_id, vehicle_id, amount_baisa, remaining_baisa, method, reference, status,
    journal_entry_id, received_at, refunded_at, created_at
"#;

/// Record money received from a customer.
///
/// # Errors
///
/// - `Ledger`: Amount is zero or negative, or the date is locked
/// - `NotFound`: Customer doesn't exist
pub async fn receive_deposit(
    pool: &DbPool,
    user_id: i64,
    request: ReceiveDepositRequest,
) -> Result<CustomerDeposit, AppError> {
    ledger::ensure_positive(request.amount_baisa)?;

    let company_name: String =
        sqlx::query_scalar("SELECT company_name FROM customers WHERE id = $1")
            .bind(request.customer_id)
            .fetch_optional(pool)
            .await?
            .ok_or(AppError::NotFound("Customer"))?;

    let received_at = request
        .received_at
        .unwrap_or_else(|| Utc::now().date_naive());

    let mut tx = pool.begin().await?;

    let entry = journal_service::post_entry_in_tx(
        &mut tx,
        Some(user_id),
        &PostJournalRequest {
            reference: request.reference.clone(),
            customer_id: Some(request.customer_id),
            vehicle_id: request.vehicle_id,
            is_client_fund: true,
            ..PostJournalRequest::system(
                received_at,
                format!("Client deposit from {}", company_name),
                vec![
                    PostingLine::debit(codes::BANK, request.amount_baisa),
                    PostingLine::credit(codes::CUSTOMER_DEPOSITS, request.amount_baisa),
                ],
            )
        },
    )
    .await?;

    let deposit = sqlx::query_as::<_, CustomerDeposit>(&format!(
        r#"
        INSERT INTO customer_deposits (
            customer_id, vehicle_id, amount_baisa, remaining_baisa, method, reference,
            journal_entry_id, received_at
        )
        VALUES ($1, $2, $3, $3, $4, $5, $6, $7)
        RETURNING {DEPOSIT_COLUMNS}
        "#
    ))
    .bind(request.customer_id)
    .bind(request.vehicle_id)
    .bind(request.amount_baisa)
    .bind(request.method)
    .bind(request.reference)
    .bind(entry.id)
    .bind(received_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Deposit {} of {} baisa received for customer {}",
        deposit.id,
        deposit.amount_baisa,
        deposit.customer_id
    );

    Ok(deposit)
}

/// Take an earned commission out of a held deposit.
///
/// # Process
///
/// 1. Lock the deposit row (`FOR UPDATE`)
/// 2. Check it is held and covers the amount
/// 3. Post Dr L200 / Cr R200
/// 4. Reduce `remaining_baisa`; a deposit used up becomes `applied`
///
/// # Errors
///
/// - `InsufficientDeposit`: amount exceeds what is left
/// - `Conflict`: deposit is no longer held
pub async fn deduct_commission(
    pool: &DbPool,
    deposit_id: i64,
    user_id: i64,
    request: DeductCommissionRequest,
) -> Result<CustomerDeposit, AppError> {
    ledger::ensure_positive(request.amount_baisa)?;

    let mut tx = pool.begin().await?;

    let deposit = lock_deposit(&mut tx, deposit_id).await?;
    let (remaining_baisa, status) = reduce_deposit(&deposit, request.amount_baisa)?;

    let entry_date = request
        .entry_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let description = request
        .description
        .unwrap_or_else(|| format!("Commission deducted from deposit {}", deposit.id));

    journal_service::post_entry_in_tx(
        &mut tx,
        Some(user_id),
        &PostJournalRequest {
            reference: deposit.reference.clone(),
            customer_id: Some(deposit.customer_id),
            vehicle_id: deposit.vehicle_id,
            ..PostJournalRequest::system(
                entry_date,
                description,
                vec![
                    PostingLine::debit(codes::CUSTOMER_DEPOSITS, request.amount_baisa),
                    PostingLine::credit(codes::COMMISSION_REVENUE, request.amount_baisa),
                ],
            )
        },
    )
    .await?;

    let deposit = sqlx::query_as::<_, CustomerDeposit>(&format!(
        r#"
        UPDATE customer_deposits
        SET remaining_baisa = $1, status = $2
        WHERE id = $3
        RETURNING {DEPOSIT_COLUMNS}
        "#
    ))
    .bind(remaining_baisa)
    .bind(status)
    .bind(deposit_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Commission of {} baisa deducted from deposit {} ({} left)",
        request.amount_baisa,
        deposit.id,
        deposit.remaining_baisa
    );

    Ok(deposit)
}

/// Return what is left of a deposit to the customer.
pub async fn refund_deposit(
    pool: &DbPool,
    deposit_id: i64,
    user_id: i64,
    request: RefundDepositRequest,
) -> Result<CustomerDeposit, AppError> {
    let mut tx = pool.begin().await?;

    let deposit = lock_deposit(&mut tx, deposit_id).await?;
    let refund_baisa = refundable_amount(&deposit)?;

    let refunded_at = request
        .refunded_at
        .unwrap_or_else(|| Utc::now().date_naive());

    journal_service::post_entry_in_tx(
        &mut tx,
        Some(user_id),
        &PostJournalRequest {
            reference: deposit.reference.clone(),
            customer_id: Some(deposit.customer_id),
            vehicle_id: deposit.vehicle_id,
            is_client_fund: true,
            ..PostJournalRequest::system(
                refunded_at,
                format!("Refund of deposit {}", deposit.id),
                vec![
                    PostingLine::debit(codes::CUSTOMER_DEPOSITS, refund_baisa),
                    PostingLine::credit(codes::BANK, refund_baisa),
                ],
            )
        },
    )
    .await?;

    let refunded = sqlx::query_as::<_, CustomerDeposit>(&format!(
        r#"
        UPDATE customer_deposits
        SET remaining_baisa = 0, status = $1, refunded_at = $2
        WHERE id = $3
        RETURNING {DEPOSIT_COLUMNS}
        "#
    ))
    .bind(REFUNDED)
    .bind(refunded_at)
    .bind(deposit_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Deposit {} refunded ({} baisa)", deposit.id, refund_baisa);

    Ok(refunded)
}

/// Remaining balance and status once `amount` is taken out of a deposit.
///
/// Only held deposits can be reduced. A deposit used up becomes `applied`.
fn reduce_deposit(
    deposit: &CustomerDeposit,
    amount: i64,
) -> Result<(i64, &'static str), AppError> {
    if deposit.status != HELD {
        return Err(AppError::Conflict(format!(
            "Deposit {} is {}",
            deposit.id, deposit.status
        )));
    }
    if deposit.remaining_baisa < amount {
        return Err(AppError::InsufficientDeposit);
    }

    let remaining = deposit.remaining_baisa - amount;
    let status = if remaining == 0 { APPLIED } else { HELD };
    Ok((remaining, status))
}

/// What a refund would pay out: everything left on a held deposit.
fn refundable_amount(deposit: &CustomerDeposit) -> Result<i64, AppError> {
    if deposit.status != HELD || deposit.remaining_baisa == 0 {
        return Err(AppError::Conflict(format!(
            "Deposit {} has nothing left to refund",
            deposit.id
        )));
    }
    Ok(deposit.remaining_baisa)
}

async fn lock_deposit(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    deposit_id: i64,
) -> Result<CustomerDeposit, AppError> {
    let deposit = sqlx::query_as::<_, CustomerDeposit>(&format!(
        "SELECT {DEPOSIT_COLUMNS} FROM customer_deposits WHERE id = $1 FOR UPDATE"
    ))
    .bind(deposit_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(AppError::NotFound("Deposit"))?;

    Ok(deposit)
}

pub async fn get_deposit(pool: &DbPool, deposit_id: i64) -> Result<CustomerDeposit, AppError> {
    let deposit = sqlx::query_as::<_, CustomerDeposit>(&format!(
        "SELECT {DEPOSIT_COLUMNS} FROM customer_deposits WHERE id = $1"
    ))
    .bind(deposit_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Deposit"))?;

    Ok(deposit)
}

/// Deposits of one customer and their L200 balance.
///
/// The balance comes from the journal, not from `remaining_baisa`, so manual
/// postings tagged with the customer are included.
pub async fn customer_statement(
    pool: &DbPool,
    customer_id: i64,
) -> Result<DepositStatement, AppError> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE id = $1")
        .bind(customer_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Customer"));
    }

    let balance_baisa: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(l.credit_baisa - l.debit_baisa), 0)::BIGINT
        FROM journal_lines l
        JOIN journal_entries e ON e.id = l.entry_id
        JOIN accounts a ON a.id = l.account_id
        WHERE e.customer_id = $1
          AND e.status = 'approved'
          AND a.code = $2
        "#,
    )
    .bind(customer_id)
    .bind(codes::CUSTOMER_DEPOSITS)
    .fetch_one(pool)
    .await?;

    let deposits = sqlx::query_as::<_, CustomerDeposit>(&format!(
        "SELECT {DEPOSIT_COLUMNS} FROM customer_deposits WHERE customer_id = $1 ORDER BY received_at, id"
    ))
    .bind(customer_id)
    .fetch_all(pool)
    .await?;

    Ok(DepositStatement {
        customer_id,
        balance_baisa,
        deposits,
    })
}

/// Customer record linked to a login, for customers reading their own statement.
pub async fn customer_id_for_user(pool: &DbPool, user_id: i64) -> Result<i64, AppError> {
    let customer_id: i64 = sqlx::query_scalar("SELECT id FROM customers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Customer"))?;

    Ok(customer_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit(status: &str, amount: i64, remaining: i64) -> CustomerDeposit {
        CustomerDeposit {
            id: 7,
            customer_id: 3,
            vehicle_id: None,
            amount_baisa: amount,
            remaining_baisa: remaining,
            method: None,
            reference: None,
            status: status.to_string(),
            journal_entry_id: 41,
            received_at: chrono::NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            refunded_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_partial_commission_keeps_deposit_held() {
        let held = deposit("held", 1_000_000, 1_000_000);
        assert_eq!(reduce_deposit(&held, 150_000).unwrap(), (850_000, "held"));
    }

    #[test]
    fn test_deposit_used_up_becomes_applied() {
        let held = deposit("held", 1_000_000, 150_000);
        assert_eq!(reduce_deposit(&held, 150_000).unwrap(), (0, "applied"));
    }

    #[test]
    fn test_commission_above_remaining_is_insufficient() {
        let held = deposit("held", 1_000_000, 100_000);
        assert!(matches!(
            reduce_deposit(&held, 100_001),
            Err(AppError::InsufficientDeposit)
        ));
    }

    #[test]
    fn test_only_held_deposits_can_be_reduced() {
        let refunded = deposit("refunded", 1_000_000, 0);
        assert!(matches!(
            reduce_deposit(&refunded, 1),
            Err(AppError::Conflict(_))
        ));
        let applied = deposit("applied", 1_000_000, 0);
        assert!(matches!(
            reduce_deposit(&applied, 1),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_refund_pays_out_remaining() {
        let held = deposit("held", 1_000_000, 400_000);
        assert_eq!(refundable_amount(&held).unwrap(), 400_000);
    }

    #[test]
    fn test_refund_rejected_for_non_held_deposit() {
        for status in ["refunded", "applied"] {
            let done = deposit(status, 1_000_000, 0);
            assert!(matches!(
                refundable_amount(&done),
                Err(AppError::Conflict(_))
            ));
        }
        // Held but empty
        let empty = deposit("held", 1_000_000, 0);
        assert!(matches!(
            refundable_amount(&empty),
            Err(AppError::Conflict(_))
        ));
    }
}
