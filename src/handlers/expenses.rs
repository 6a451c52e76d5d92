//! Operational expense HTTP handlers (admin, accountant).
//!
//! - POST /api/v1/expenses
//! - GET /api/v1/expenses?vehicle_id=
//! - POST /api/v1/expenses/{id}/pay

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        expense::{OperationalExpense, PayExpenseRequest, RecordExpenseRequest},
        role::FINANCE,
    },
    services::{audit_service, expense_service},
};

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    pub vehicle_id: Option<i64>,
}

/// Record an expense. USD amounts use `exchange_rate_micros` or `OMR_EXCHANGE_RATE`.
///
/// # Response
///
/// - **Success (201 Created)**: The expense with its baisa amount
/// - **Error (400)**: Unsupported currency, non-positive amount
/// - **Error (422)**: Date is locked
pub async fn record_expense(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<RecordExpenseRequest>,
) -> Result<(StatusCode, Json<OperationalExpense>), AppError> {
    auth.require(FINANCE)?;

    let expense =
        expense_service::record_expense(&pool, auth.user_id, config.omr_rate_micros(), request)
            .await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "record",
        "Expense",
        Some(expense.id),
        serde_json::json!({
            "category": expense.category,
            "amount_baisa": expense.amount_baisa,
        }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn list_expenses(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<OperationalExpense>>, AppError> {
    auth.require(FINANCE)?;

    Ok(Json(
        expense_service::list_expenses(&pool, query.vehicle_id).await?,
    ))
}

pub async fn pay_expense(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(expense_id): Path<i64>,
    request: Option<Json<PayExpenseRequest>>,
) -> Result<Json<OperationalExpense>, AppError> {
    auth.require(FINANCE)?;
    let request = request.map(|Json(body)| body).unwrap_or_default();

    let expense = expense_service::pay_expense(&pool, expense_id, auth.user_id, request).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "pay",
        "Expense",
        Some(expense.id),
        serde_json::json!({ "payment_entry_id": expense.payment_entry_id }),
    )
    .await;

    Ok(Json(expense))
}
