//! Client deposit HTTP handlers.
//!
//! - POST /api/v1/deposits - Receive a deposit (admin, accountant)
//! - GET /api/v1/deposits/{id}
//! - POST /api/v1/deposits/{id}/commission - Deduct earned commission
//! - POST /api/v1/deposits/{id}/refund - Refund what is left
//! - GET /api/v1/customers/{id}/deposits - Statement for one customer
//! - GET /api/v1/me/deposits - Statement for the logged-in customer

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        deposit::{
            CustomerDeposit, DeductCommissionRequest, DepositStatement, ReceiveDepositRequest,
            RefundDepositRequest,
        },
        role::{FINANCE, Role},
    },
    services::{audit_service, deposit_service},
};

/// Receive a client deposit: Dr A100 / Cr L200.
///
/// # Response
///
/// - **Success (201 Created)**: The deposit, status `held`
/// - **Error (404)**: Customer doesn't exist
/// - **Error (422)**: Date is locked
pub async fn receive_deposit(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<ReceiveDepositRequest>,
) -> Result<(StatusCode, Json<CustomerDeposit>), AppError> {
    auth.require(FINANCE)?;

    let deposit = deposit_service::receive_deposit(&pool, auth.user_id, request).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "receive",
        "Deposit",
        Some(deposit.id),
        serde_json::json!({
            "customer_id": deposit.customer_id,
            "amount_baisa": deposit.amount_baisa,
        }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(deposit)))
}

pub async fn get_deposit(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(deposit_id): Path<i64>,
) -> Result<Json<CustomerDeposit>, AppError> {
    auth.require(FINANCE)?;

    Ok(Json(deposit_service::get_deposit(&pool, deposit_id).await?))
}

/// Deduct commission: Dr L200 / Cr R200. 422 `insufficient_deposit` if it doesn't fit.
pub async fn deduct_commission(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(deposit_id): Path<i64>,
    Json(request): Json<DeductCommissionRequest>,
) -> Result<Json<CustomerDeposit>, AppError> {
    auth.require(FINANCE)?;

    let amount_baisa = request.amount_baisa;
    let deposit =
        deposit_service::deduct_commission(&pool, deposit_id, auth.user_id, request).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "deduct_commission",
        "Deposit",
        Some(deposit.id),
        serde_json::json!({
            "amount_baisa": amount_baisa,
            "remaining_baisa": deposit.remaining_baisa,
        }),
    )
    .await;

    Ok(Json(deposit))
}

pub async fn refund_deposit(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(deposit_id): Path<i64>,
    request: Option<Json<RefundDepositRequest>>,
) -> Result<Json<CustomerDeposit>, AppError> {
    auth.require(FINANCE)?;
    let request = request.map(|Json(body)| body).unwrap_or_default();

    let deposit = deposit_service::refund_deposit(&pool, deposit_id, auth.user_id, request).await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "refund",
        "Deposit",
        Some(deposit.id),
        serde_json::json!({ "customer_id": deposit.customer_id }),
    )
    .await;

    Ok(Json(deposit))
}

pub async fn customer_statement(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(customer_id): Path<i64>,
) -> Result<Json<DepositStatement>, AppError> {
    auth.require(FINANCE)?;

    Ok(Json(
        deposit_service::customer_statement(&pool, customer_id).await?,
    ))
}

/// The calling customer's own statement.
pub async fn my_statement(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<DepositStatement>, AppError> {
    auth.require(&[Role::Customer])?;

    let customer_id = deposit_service::customer_id_for_user(&pool, auth.user_id).await?;

    Ok(Json(
        deposit_service::customer_statement(&pool, customer_id).await?,
    ))
}
