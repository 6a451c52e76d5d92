//! Chart-of-accounts HTTP handlers.
//!
//! This module implements the account-related API endpoints:
//! - POST /api/v1/accounts - Create new account
//! - GET /api/v1/accounts/{id} - Get account with its balance
//! - GET /api/v1/accounts - List the chart of accounts

use crate::{
    db::DbPool,
    error::AppError,
    ledger::AccountType,
    middleware::auth::AuthContext,
    models::{
        account::{Account, AccountResponse, CreateAccountRequest},
        role::FINANCE,
    },
    services::{audit_service, report_service},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

const ACCOUNT_COLUMNS: &str =
    "id, code, name, account_type, currency_code, is_cash, active, created_at";

/// Create a new account.
///
/// # Endpoint
///
/// `POST /api/v1/accounts`
///
/// # Request Body
///
/// ```json
/// {
///   "code": "A120",
///   "name": "Petty Cash",
///   "account_type": "asset",
///   "is_cash": true
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: Returns the created account
/// - **Error (400)**: Unknown account type or malformed code
/// - **Error (409)**: Code already in use
pub async fn create_account(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    auth.require(FINANCE)?;

    let code = request.code.trim().to_ascii_uppercase();
    if code.is_empty() || code.len() > 20 {
        return Err(AppError::InvalidRequest(
            "Account code must be 1 to 20 characters".to_string(),
        ));
    }
    let account_type: AccountType = request.account_type.parse()?;
    let currency_code = request.currency_code.trim().to_ascii_uppercase();
    if currency_code.len() != 3 {
        return Err(AppError::InvalidRequest(
            "Currency must be a 3-letter code".to_string(),
        ));
    }

    let account = sqlx::query_as::<_, Account>(&format!(
        r#"
        INSERT INTO accounts (code, name, account_type, currency_code, is_cash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {ACCOUNT_COLUMNS}
        "#
    ))
    .bind(&code)
    .bind(request.name.trim())
    .bind(account_type.as_str())
    .bind(&currency_code)
    .bind(request.is_cash)
    .fetch_one(&pool)
    .await?;

    audit_service::record(
        &pool,
        Some(auth.user_id),
        "create",
        "Account",
        Some(account.id),
        serde_json::json!({ "code": account.code }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Get one account with its balance from approved entries.
///
/// `GET /api/v1/accounts/{id}`
pub async fn get_account(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountResponse>, AppError> {
    auth.require(FINANCE)?;

    let account = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
    ))
    .bind(account_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Account"))?;

    let account_type: AccountType = account.account_type.parse()?;
    let balance = report_service::account_balance(&pool, account.id, account_type).await?;

    Ok(Json(AccountResponse::from(account).with_balance(balance)))
}

/// List the chart of accounts, ordered by code.
///
/// `GET /api/v1/accounts`
pub async fn list_accounts(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    auth.require(FINANCE)?;

    let accounts = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY code"
    ))
    .fetch_all(&pool)
    .await?;

    let responses: Vec<AccountResponse> = accounts.into_iter().map(Into::into).collect();

    Ok(Json(responses))
}
